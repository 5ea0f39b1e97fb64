use super::collision::probe;
use super::constants::{
    MAX_POWERUPS, MAX_SPAWN_ATTEMPTS, RESPAWN_RETRY_TICKS, SPAWN_PROBE_RADIUS, STARTING_HEADING,
};
use super::math::Vector2D;
use super::types::{EntityId, Powerup, Snake};
use super::world::World;
use rand::Rng;

impl World {
    /// Samples uniform points in `[-size/2, size/2)` until one is clear of every entity.
    /// Gives up after `MAX_SPAWN_ATTEMPTS` tries.
    pub fn valid_random_position(&self) -> Option<Vector2D> {
        let half = self.size / 2.0;
        if !half.is_finite() || half <= 0.0 {
            return None;
        }
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let candidate = Vector2D::new(rng.gen_range(-half..half), rng.gen_range(-half..half));
            if probe(self, candidate, SPAWN_PROBE_RADIUS, None).is_none() {
                return Some(candidate);
            }
        }
        tracing::warn!(size = self.size, "spawn search exhausted");
        None
    }

    /// Places at most one powerup while under the cap. Needs at least one wall and is
    /// disabled in survival mode.
    pub fn maybe_spawn_powerup(&mut self, survival_mode: bool) -> Option<EntityId> {
        if survival_mode || self.walls.is_empty() || self.live_powerup_count() >= MAX_POWERUPS {
            return None;
        }
        let loc = self.valid_random_position()?;
        let id = self.next_powerup_id;
        self.next_powerup_id = self.next_powerup_id.wrapping_add(1);
        self.powerups.insert(id, Powerup::new(id, loc));
        Some(id)
    }

    /// Creates the snake for a newly joined player. If no free spot exists it waits in
    /// the dead map and is retried by the respawn pass.
    pub fn join_snake(&mut self, id: EntityId, name: String) -> bool {
        if self.has_snake(id) {
            return false;
        }
        match self.valid_random_position() {
            Some(position) => {
                self.snakes.insert(id, Snake::new(id, name, position, STARTING_HEADING));
            }
            None => {
                let mut snake = Snake::new(id, name, Vector2D::default(), STARTING_HEADING);
                snake.alive = false;
                snake.respawn_timer = RESPAWN_RETRY_TICKS;
                self.dead_snakes.insert(id, snake);
            }
        }
        true
    }

    /// Counts down every dead snake and brings back the ones that are due.
    /// Returns the ids that respawned this tick.
    pub fn advance_respawns(&mut self) -> Vec<EntityId> {
        let mut respawned = Vec::new();
        for id in self.dead_snake_ids() {
            let due = match self.dead_snakes.get_mut(&id) {
                Some(snake) => {
                    snake.respawn_timer -= 1;
                    snake.respawn_timer <= 0
                }
                None => false,
            };
            if !due {
                continue;
            }

            let Some(position) = self.valid_random_position() else {
                if let Some(snake) = self.dead_snakes.get_mut(&id) {
                    snake.respawn_timer = RESPAWN_RETRY_TICKS;
                }
                continue;
            };
            let Some(dead) = self.dead_snakes.remove(&id) else { continue };
            self.snakes.insert(id, Snake::new(id, dead.name, position, STARTING_HEADING));
            tracing::debug!(snake_id = id, "snake respawned");
            respawned.push(id);
        }
        respawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Wall;

    fn bordered_world(size: f64) -> World {
        let half = size / 2.0;
        World::new(
            size,
            [Wall {
                id: 0,
                p1: Vector2D::new(-half, -half),
                p2: Vector2D::new(half, -half),
            }],
        )
    }

    #[test]
    fn random_positions_are_clear_and_in_bounds() {
        let world = bordered_world(1000.0);
        for _ in 0..50 {
            let position = world.valid_random_position().expect("free space");
            assert!(position.x >= -500.0 && position.x < 500.0);
            assert!(position.y >= -500.0 && position.y < 500.0);
            assert!(probe(&world, position, SPAWN_PROBE_RADIUS, None).is_none());
        }
    }

    #[test]
    fn packed_arena_gives_up() {
        let world = World::new(
            100.0,
            [Wall {
                id: 0,
                p1: Vector2D::new(0.0, -50.0),
                p2: Vector2D::new(0.0, 50.0),
            }],
        );
        assert_eq!(world.valid_random_position(), None);
    }

    #[test]
    fn zero_sized_arena_has_no_positions() {
        assert_eq!(World::new(0.0, []).valid_random_position(), None);
    }

    #[test]
    fn powerup_spawns_only_below_cap() {
        let mut world = bordered_world(4000.0);
        for _ in 0..29 {
            world.maybe_spawn_powerup(false).expect("spawned");
        }
        assert_eq!(world.powerups.len(), 29);
        assert!(world.maybe_spawn_powerup(false).is_some());
        assert_eq!(world.powerups.len(), 30);
        assert_eq!(world.maybe_spawn_powerup(false), None);
        assert_eq!(world.powerups.len(), 30);
    }

    #[test]
    fn powerups_need_walls_and_normal_mode() {
        let mut world = World::new(1000.0, []);
        assert_eq!(world.maybe_spawn_powerup(false), None);
        let mut world = bordered_world(1000.0);
        assert_eq!(world.maybe_spawn_powerup(true), None);
    }

    #[test]
    fn powerup_ids_increase() {
        let mut world = bordered_world(2000.0);
        let first = world.maybe_spawn_powerup(false).expect("spawned");
        let second = world.maybe_spawn_powerup(false).expect("spawned");
        assert!(second > first);
    }

    #[test]
    fn join_ignores_known_ids() {
        let mut world = bordered_world(1000.0);
        assert!(world.join_snake(4, "first".to_string()));
        assert!(!world.join_snake(4, "second".to_string()));
        let snake = &world.snakes[&4];
        assert_eq!(snake.name, "first");
        assert!(snake.just_joined);
        assert_eq!(snake.body.len(), 2);
        assert_eq!(snake.body[0], snake.body[1]);
        assert_eq!(snake.dir, Vector2D::new(1.0, 0.0));
    }

    #[test]
    fn join_in_packed_arena_waits_in_dead_map() {
        let mut world = World::new(0.0, []);
        assert!(world.join_snake(1, "late".to_string()));
        assert!(!world.snakes.contains_key(&1));
        assert_eq!(world.dead_snakes[&1].respawn_timer, RESPAWN_RETRY_TICKS);
    }

    #[test]
    fn respawn_happens_when_timer_expires() {
        let mut world = bordered_world(1000.0);
        world.join_snake(2, "again".to_string());
        world.snakes.get_mut(&2).expect("snake").score = 7;
        world.retire_snake(2, 3);

        assert!(world.advance_respawns().is_empty());
        assert!(world.advance_respawns().is_empty());
        assert_eq!(world.advance_respawns(), vec![2]);

        assert!(!world.dead_snakes.contains_key(&2));
        let snake = world.snakes.remove(&2).expect("respawned");
        assert_eq!(snake.name, "again");
        assert_eq!(snake.score, 0);
        assert!(snake.alive);
        assert!(!snake.died);
        assert_eq!(snake.dir, STARTING_HEADING);
        // Clearance is judged against the world the snake was placed into.
        assert!(probe(&world, snake.head(), SPAWN_PROBE_RADIUS, None).is_none());
    }
}
