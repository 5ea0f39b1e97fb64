use super::types::{EntityId, Powerup, Snake, Wall};
use std::collections::HashMap;

/// Authoritative entity store for one arena. A snake id lives in at most one of
/// `snakes` / `dead_snakes` at a time.
#[derive(Debug, Default)]
pub struct World {
    pub size: f64,
    pub snakes: HashMap<EntityId, Snake>,
    pub dead_snakes: HashMap<EntityId, Snake>,
    pub walls: HashMap<EntityId, Wall>,
    pub powerups: HashMap<EntityId, Powerup>,
    pub(super) next_powerup_id: EntityId,
}

impl World {
    pub fn new(size: f64, walls: impl IntoIterator<Item = Wall>) -> Self {
        let mut world = Self {
            size,
            ..Self::default()
        };
        for wall in walls {
            world.add_wall(wall);
        }
        world
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.insert(wall.id, wall);
    }

    /// True while the id belongs to a live snake or one waiting to respawn.
    pub fn has_snake(&self, id: EntityId) -> bool {
        self.snakes.contains_key(&id) || self.dead_snakes.contains_key(&id)
    }

    pub fn add_powerup(&mut self, powerup: Powerup) {
        self.next_powerup_id = self.next_powerup_id.max(powerup.id.wrapping_add(1));
        self.powerups.insert(powerup.id, powerup);
    }

    pub fn live_powerup_count(&self) -> usize {
        self.powerups.len()
    }

    /// Drops powerups consumed on an earlier tick; they have already been broadcast once.
    pub fn purge_consumed_powerups(&mut self) -> usize {
        let before = self.powerups.len();
        self.powerups.retain(|_, powerup| !powerup.died);
        before - self.powerups.len()
    }

    /// Moves a snake from the live map to the dead map and arms its respawn countdown.
    pub fn retire_snake(&mut self, id: EntityId, respawn_rate: i32) -> bool {
        let Some(mut snake) = self.snakes.remove(&id) else { return false };
        snake.alive = false;
        snake.respawn_timer = respawn_rate;
        self.dead_snakes.insert(id, snake);
        true
    }

    pub fn snake_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.snakes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn dead_snake_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.dead_snakes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
