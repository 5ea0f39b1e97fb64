//! Point-versus-world overlap queries.
//!
//! Categories are checked in a fixed order (walls, then powerups, then snakes)
//! and the first hit wins, so a point touching both a wall and a powerup
//! reports the wall.

use super::constants::{
    POWERUP_RADIUS, SELF_COLLISION_HALF_THICKNESS, SNAKE_HALF_THICKNESS, WALL_HALF_THICKNESS,
};
use super::math::{within_bounds_of_line, Vector2D};
use super::types::{EntityId, Powerup, Snake, Wall};
use super::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall(EntityId),
    Powerup(EntityId),
    Snake(EntityId),
}

/// Returns the first entity overlapping a circle of `radius` at `pos`. Powerups already
/// eaten this tick are ignored.
///
/// `exclude` selects the self-collision rules for the snake with that id; every
/// other snake is tested as a foreign body. Pass `None` to treat all snakes as foreign.
pub fn probe(world: &World, pos: Vector2D, radius: f64, exclude: Option<EntityId>) -> Option<Collision> {
    if let Some(wall) = world.walls.values().find(|wall| hits_wall(pos, wall, radius)) {
        return Some(Collision::Wall(wall.id));
    }

    if let Some(powerup) = world
        .powerups
        .values()
        .find(|powerup| !powerup.died && hits_powerup(pos, powerup, radius))
    {
        return Some(Collision::Powerup(powerup.id));
    }

    world
        .snakes
        .values()
        .find(|snake| hits_snake(pos, snake, exclude, radius))
        .map(|snake| Collision::Snake(snake.id))
}

fn hits_wall(pos: Vector2D, wall: &Wall, radius: f64) -> bool {
    within_bounds_of_line(pos, wall.p1, wall.p2, WALL_HALF_THICKNESS + radius)
}

fn hits_powerup(pos: Vector2D, powerup: &Powerup, radius: f64) -> bool {
    (pos - powerup.loc).length() <= POWERUP_RADIUS + radius
}

fn hits_snake(pos: Vector2D, snake: &Snake, exclude: Option<EntityId>, radius: f64) -> bool {
    if exclude == Some(snake.id) {
        return hits_own_body(pos, &snake.body);
    }
    snake
        .body
        .windows(2)
        .any(|pair| within_bounds_of_line(pos, pair[0], pair[1], SNAKE_HALF_THICKNESS + radius))
}

// The two newest segments are skipped; the head always sits on them right after a turn.
fn hits_own_body(pos: Vector2D, body: &[Vector2D]) -> bool {
    if body.len() <= 3 {
        return false;
    }
    let segment_index = body.len() - 3;
    (1..segment_index)
        .rev()
        .any(|i| within_bounds_of_line(pos, body[i], body[i - 1], SELF_COLLISION_HALF_THICKNESS))
}
