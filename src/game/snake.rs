use super::collision::{probe, Collision};
use super::constants::{HEAD_PROBE_RADIUS, MIN_TURN_SEGMENT, MOVE_SPEED, POWERUP_GROWTH};
use super::math::{is_right_angle_multiple, Vector2D};
use super::types::{EntityId, Snake};
use super::world::World;

/// Advances the head by one step along `dir`, then pulls the tail forward by the same
/// distance once the body is longer than its target length. Survival mode never trims.
pub fn move_snake(snake: &mut Snake, survival_mode: bool) {
    let head_index = snake.body.len() - 1;
    snake.body[head_index] = snake.body[head_index] + snake.dir * MOVE_SPEED;

    if survival_mode || snake.total_length() <= snake.length {
        return;
    }

    let mut movement_left = MOVE_SPEED;
    while movement_left > 0.0 {
        let tail_segment = (snake.body[1] - snake.body[0]).length();
        if tail_segment < movement_left && snake.body.len() > 2 {
            movement_left -= tail_segment;
            snake.body.remove(0);
            continue;
        }
        let tail_dir = (snake.body[1] - snake.body[0]).normalized();
        let step = movement_left.min(tail_segment);
        snake.body[0] = snake.body[0] + tail_dir * step;
        break;
    }
}

/// Applies a turn request. Accepted turns open a new zero-length segment at the head.
///
/// A turn must be a non-zero multiple of 90 degrees from the current heading, and the
/// newest segment must be at least `MIN_TURN_SEGMENT` long unless the turn reverses the
/// segment before it. Returns whether the turn was taken.
pub fn change_direction(snake: &mut Snake, new_dir: Vector2D) -> bool {
    let count = snake.body.len();
    let head = snake.body[count - 1];
    let neck = snake.body[count - 2];
    let newest_segment = (head - neck).length();

    let reverses_previous = count >= 3 && {
        let previous_dir = (neck - snake.body[count - 3]).normalized();
        previous_dir.length() > 0.0 && (-previous_dir).approx_eq(new_dir)
    };
    if newest_segment < MIN_TURN_SEGMENT && !reverses_previous {
        return false;
    }

    let angle = snake.dir.angle_between(new_dir);
    if angle < 1e-6 || !is_right_angle_multiple(angle) {
        return false;
    }

    snake.body.push(head);
    snake.dir = new_dir;
    true
}

/// Probes the head of a live snake and applies the result: walls and snakes kill,
/// a powerup is eaten. Returns what was hit.
pub fn test_collision(world: &mut World, snake_id: EntityId) -> Option<Collision> {
    let head = match world.snakes.get(&snake_id) {
        Some(snake) if snake.alive => snake.head(),
        _ => return None,
    };

    let hit = probe(world, head, HEAD_PROBE_RADIUS, Some(snake_id))?;
    match hit {
        Collision::Wall(_) | Collision::Snake(_) => {
            if let Some(snake) = world.snakes.get_mut(&snake_id) {
                snake.died = true;
                snake.alive = false;
                tracing::debug!(snake_id, ?hit, "snake died");
            }
        }
        Collision::Powerup(powerup_id) => {
            if let Some(powerup) = world.powerups.get_mut(&powerup_id) {
                powerup.died = true;
            }
            if let Some(snake) = world.snakes.get_mut(&snake_id) {
                snake.length += POWERUP_GROWTH;
                snake.score += 1;
            }
        }
    }
    Some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{Powerup, Wall};

    fn v(x: f64, y: f64) -> Vector2D {
        Vector2D::new(x, y)
    }

    fn snake_with_body(body: Vec<Vector2D>, dir: Vector2D) -> Snake {
        let mut snake = Snake::new(1, "test".to_string(), body[0], dir);
        snake.body = body;
        snake
    }

    #[test]
    fn head_advances_by_move_speed() {
        let mut snake = Snake::new(1, "test".to_string(), v(10.0, 10.0), v(0.0, -1.0));
        move_snake(&mut snake, false);
        assert_eq!(snake.head(), v(10.0, 7.0));
        assert_eq!(snake.tail(), v(10.0, 10.0));
    }

    #[test]
    fn growing_snake_keeps_its_tail() {
        let mut snake = Snake::new(1, "test".to_string(), v(0.0, 0.0), v(1.0, 0.0));
        for _ in 0..33 {
            move_snake(&mut snake, false);
        }
        assert_eq!(snake.tail(), v(0.0, 0.0));
        assert_eq!(snake.head(), v(99.0, 0.0));
        move_snake(&mut snake, false);
        move_snake(&mut snake, false);
        assert_eq!(snake.head(), v(105.0, 0.0));
        assert_eq!(snake.tail(), v(6.0, 0.0));
        assert!(snake.total_length() <= snake.length);
    }

    #[test]
    fn tail_drops_whole_segments_before_trimming() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 200.0)], v(0.0, 1.0));
        move_snake(&mut snake, false);
        assert_eq!(snake.body.len(), 2);
        assert!(snake.tail().approx_eq(v(1.0, 2.0)));
        assert_eq!(snake.head(), v(1.0, 203.0));
    }

    #[test]
    fn survival_mode_never_shrinks() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(300.0, 0.0)], v(1.0, 0.0));
        move_snake(&mut snake, true);
        assert_eq!(snake.tail(), v(0.0, 0.0));
        assert_eq!(snake.head(), v(303.0, 0.0));
    }

    #[test]
    fn body_keeps_two_joints_after_long_trim() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(0.0, 0.0), v(0.0, 0.0)], v(1.0, 0.0));
        snake.length = 0.0;
        move_snake(&mut snake, false);
        assert_eq!(snake.body.len(), 2);
        assert!(snake.total_length() <= 3.0);
    }

    #[test]
    fn turn_on_short_segment_is_ignored() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(5.0, 0.0)], v(1.0, 0.0));
        assert!(!change_direction(&mut snake, v(0.0, 1.0)));
        assert_eq!(snake.body.len(), 2);
        assert_eq!(snake.dir, v(1.0, 0.0));
    }

    #[test]
    fn turn_adds_joint_at_head() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(30.0, 0.0)], v(1.0, 0.0));
        assert!(change_direction(&mut snake, v(0.0, -1.0)));
        assert_eq!(snake.body, vec![v(0.0, 0.0), v(30.0, 0.0), v(30.0, 0.0)]);
        assert_eq!(snake.dir, v(0.0, -1.0));
    }

    #[test]
    fn same_heading_is_not_a_turn() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(30.0, 0.0)], v(1.0, 0.0));
        assert!(!change_direction(&mut snake, v(1.0, 0.0)));
        assert_eq!(snake.body.len(), 2);
    }

    #[test]
    fn quick_reversal_allowed_on_short_segment() {
        // Heading right, just turned down; going left reverses the older segment.
        let mut snake = snake_with_body(
            vec![v(0.0, 0.0), v(30.0, 0.0), v(30.0, 3.0)],
            v(0.0, 1.0),
        );
        assert!(change_direction(&mut snake, v(-1.0, 0.0)));
        assert_eq!(snake.body.len(), 4);
        assert_eq!(snake.dir, v(-1.0, 0.0));
    }

    #[test]
    fn direct_reversal_on_long_segment_is_accepted() {
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(30.0, 0.0)], v(1.0, 0.0));
        assert!(change_direction(&mut snake, v(-1.0, 0.0)));
        assert_eq!(snake.dir, v(-1.0, 0.0));
    }

    #[test]
    fn wall_hit_kills_snake() {
        let mut world = World::new(1000.0, [Wall { id: 0, p1: v(100.0, -50.0), p2: v(100.0, 50.0) }]);
        world
            .snakes
            .insert(1, snake_with_body(vec![v(0.0, 0.0), v(75.0, 0.0)], v(1.0, 0.0)));

        assert_eq!(test_collision(&mut world, 1), Some(Collision::Wall(0)));
        let snake = &world.snakes[&1];
        assert!(snake.died);
        assert!(!snake.alive);
    }

    #[test]
    fn powerup_hit_grows_and_scores() {
        let mut world = World::new(1000.0, []);
        world.add_powerup(Powerup::new(5, v(80.0, 0.0)));
        world
            .snakes
            .insert(1, snake_with_body(vec![v(0.0, 0.0), v(70.0, 0.0)], v(1.0, 0.0)));

        assert_eq!(test_collision(&mut world, 1), Some(Collision::Powerup(5)));
        let snake = &world.snakes[&1];
        assert_eq!(snake.score, 1);
        assert_eq!(snake.length, 150.0);
        assert!(snake.alive);
        assert!(world.powerups[&5].died);
    }

    #[test]
    fn dead_snake_is_not_tested() {
        let mut world = World::new(1000.0, [Wall { id: 0, p1: v(0.0, -50.0), p2: v(0.0, 50.0) }]);
        let mut snake = snake_with_body(vec![v(0.0, 0.0), v(0.0, 0.0)], v(1.0, 0.0));
        snake.alive = false;
        world.snakes.insert(1, snake);
        assert_eq!(test_collision(&mut world, 1), None);
        assert!(!world.snakes[&1].died);
    }
}
