use super::math::Vector2D;

pub const MOVE_SPEED: f64 = 3.0;
pub const STARTING_LENGTH: f64 = 100.0;
pub const POWERUP_GROWTH: f64 = 50.0;
pub const MIN_TURN_SEGMENT: f64 = 10.0;
pub const STARTING_HEADING: Vector2D = Vector2D::new(1.0, 0.0);

pub const WALL_HALF_THICKNESS: f64 = 25.0;
pub const POWERUP_RADIUS: f64 = 10.0;
pub const SNAKE_HALF_THICKNESS: f64 = 5.0;
pub const SELF_COLLISION_HALF_THICKNESS: f64 = 10.0;
pub const HEAD_PROBE_RADIUS: f64 = 5.0;
pub const SPAWN_PROBE_RADIUS: f64 = 50.0;

pub const MAX_POWERUPS: usize = 30;
pub const SURVIVAL_SCORE_INTERVAL: u32 = 60;
pub const MAX_SPAWN_ATTEMPTS: usize = 1_000;
pub const RESPAWN_RETRY_TICKS: i32 = 1;
