use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
  pub x: f64,
  pub y: f64,
}

impl Vector2D {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn length(self) -> f64 {
    (self.x * self.x + self.y * self.y).sqrt()
  }

  /// Scales to unit length in place. A zero (or non-finite) vector is left untouched.
  pub fn normalize(&mut self) {
    let len = self.length();
    if !len.is_finite() || len == 0.0 {
      return;
    }
    self.x /= len;
    self.y /= len;
  }

  pub fn normalized(mut self) -> Self {
    self.normalize();
    self
  }

  pub fn dot(self, other: Self) -> f64 {
    self.x * other.x + self.y * other.y
  }

  /// Unsigned angle between two vectors, in degrees. Zero when either is a zero vector.
  pub fn angle_between(self, other: Self) -> f64 {
    let denom = self.length() * other.length();
    if !denom.is_finite() || denom == 0.0 {
      return 0.0;
    }
    clamp(self.dot(other) / denom, -1.0, 1.0).acos().to_degrees()
  }

  pub fn approx_eq(self, other: Self) -> bool {
    (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
  }
}

impl Add for Vector2D {
  type Output = Vector2D;

  fn add(self, rhs: Vector2D) -> Vector2D {
    Vector2D::new(self.x + rhs.x, self.y + rhs.y)
  }
}

impl Sub for Vector2D {
  type Output = Vector2D;

  fn sub(self, rhs: Vector2D) -> Vector2D {
    Vector2D::new(self.x - rhs.x, self.y - rhs.y)
  }
}

impl Mul<f64> for Vector2D {
  type Output = Vector2D;

  fn mul(self, rhs: f64) -> Vector2D {
    Vector2D::new(self.x * rhs, self.y * rhs)
  }
}

impl Neg for Vector2D {
  type Output = Vector2D;

  fn neg(self) -> Vector2D {
    Vector2D::new(-self.x, -self.y)
  }
}

/// True when `angle` (degrees) is a whole multiple of 90, within float noise.
pub fn is_right_angle_multiple(angle: f64) -> bool {
  let remainder = angle.rem_euclid(90.0);
  remainder < 1e-6 || 90.0 - remainder < 1e-6
}

/// Loose axis-aligned box test around the segment `p1..p2`, grown by `radius` on every side.
/// Bounds are exclusive.
pub fn within_bounds_of_line(pos: Vector2D, p1: Vector2D, p2: Vector2D, radius: f64) -> bool {
  let within_x = (p1.x - radius < pos.x && pos.x < p2.x + radius)
    || (p1.x + radius > pos.x && pos.x > p2.x - radius);
  let within_y = (p1.y - radius < pos.y && pos.y < p2.y + radius)
    || (p1.y + radius > pos.y && pos.y > p2.y - radius);
  within_x && within_y
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
  value.min(max).max(min)
}
