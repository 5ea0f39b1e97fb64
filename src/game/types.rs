use super::constants::STARTING_LENGTH;
use super::math::Vector2D;
use serde::{Deserialize, Serialize};

pub type EntityId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  None,
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  /// Unit heading in screen coordinates (y grows downward). `None` has no heading.
  pub fn heading(self) -> Option<Vector2D> {
    match self {
      Direction::None => None,
      Direction::Up => Some(Vector2D::new(0.0, -1.0)),
      Direction::Down => Some(Vector2D::new(0.0, 1.0)),
      Direction::Left => Some(Vector2D::new(-1.0, 0.0)),
      Direction::Right => Some(Vector2D::new(1.0, 0.0)),
    }
  }
}

/// A snake body is a polyline of joints: `body[0]` is the tail, the last joint is the head.
#[derive(Debug, Clone)]
pub struct Snake {
  pub id: EntityId,
  pub name: String,
  pub body: Vec<Vector2D>,
  pub dir: Vector2D,
  pub length: f64,
  pub score: i32,
  pub alive: bool,
  pub died: bool,
  pub disconnected: bool,
  pub just_joined: bool,
  pub respawn_timer: i32,
}

impl Snake {
  pub fn new(id: EntityId, name: String, position: Vector2D, dir: Vector2D) -> Self {
    Self {
      id,
      name,
      body: vec![position, position],
      dir,
      length: STARTING_LENGTH,
      score: 0,
      alive: true,
      died: false,
      disconnected: false,
      just_joined: true,
      respawn_timer: 0,
    }
  }

  pub fn head(&self) -> Vector2D {
    self.body[self.body.len() - 1]
  }

  pub fn tail(&self) -> Vector2D {
    self.body[0]
  }

  pub fn total_length(&self) -> f64 {
    self
      .body
      .windows(2)
      .map(|pair| (pair[1] - pair[0]).length())
      .sum()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
  #[serde(rename = "wall")]
  pub id: EntityId,
  pub p1: Vector2D,
  pub p2: Vector2D,
}

impl Wall {
  pub fn is_axis_aligned(&self) -> bool {
    self.p1.x == self.p2.x || self.p1.y == self.p2.y
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Powerup {
  pub id: EntityId,
  pub loc: Vector2D,
  pub died: bool,
}

impl Powerup {
  pub fn new(id: EntityId, loc: Vector2D) -> Self {
    Self { id, loc, died: false }
  }
}
