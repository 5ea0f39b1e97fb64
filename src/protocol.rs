//! Line-delimited JSON records exchanged with clients.
//!
//! Server to client: a handshake (session id, world size, one record per wall), then
//! every tick one record per live snake and per powerup. Client to server: a name line,
//! then movement commands.

use crate::game::math::Vector2D;
use crate::game::types::{Direction, EntityId, Powerup, Snake, Wall};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
  Move(Direction),
  Join(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MovingCommand {
  moving: Direction,
}

/// Anything that is not a movement command is taken as the player's name.
pub fn decode_client_line(line: &str) -> ClientMessage {
  let line = line.trim_end_matches(['\r', '\n']);
  match serde_json::from_str::<MovingCommand>(line) {
    Ok(command) => ClientMessage::Move(command.moving),
    Err(_) => ClientMessage::Join(line.trim().to_string()),
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeRecord {
  pub snake: EntityId,
  pub name: String,
  pub body: Vec<Vector2D>,
  pub dir: Vector2D,
  pub score: i32,
  pub died: bool,
  pub alive: bool,
  pub dc: bool,
  pub join: bool,
}

impl From<&Snake> for SnakeRecord {
  fn from(snake: &Snake) -> Self {
    Self {
      snake: snake.id,
      name: snake.name.clone(),
      body: snake.body.clone(),
      dir: snake.dir,
      score: snake.score,
      died: snake.died,
      alive: snake.alive,
      dc: snake.disconnected,
      join: snake.just_joined,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupRecord {
  pub power: EntityId,
  pub loc: Vector2D,
  pub died: bool,
}

impl From<&Powerup> for PowerupRecord {
  fn from(powerup: &Powerup) -> Self {
    Self {
      power: powerup.id,
      loc: powerup.loc,
      died: powerup.died,
    }
  }
}

/// Any record a client may receive after the handshake numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServerRecord {
  Wall(Wall),
  Snake(SnakeRecord),
  Powerup(PowerupRecord),
}

pub fn decode_server_line(line: &str) -> Option<ServerRecord> {
  serde_json::from_str(line.trim_end()).ok()
}

fn push_record<T: Serialize>(buffer: &mut String, record: &T) {
  match serde_json::to_string(record) {
    Ok(json) => {
      buffer.push_str(&json);
      buffer.push('\n');
    }
    Err(error) => tracing::warn!(?error, "failed to encode record"),
  }
}

pub fn encode_handshake(session_id: EntityId, world_size: u32, walls: &[Wall]) -> String {
  let mut buffer = String::with_capacity(32 + walls.len() * 80);
  let _ = writeln!(buffer, "{session_id}");
  let _ = writeln!(buffer, "{world_size}");
  for wall in walls {
    push_record(&mut buffer, wall);
  }
  buffer
}

/// One tick worth of state: snakes first, then powerups.
pub fn encode_frame<'a>(
  snakes: impl IntoIterator<Item = &'a Snake>,
  powerups: impl IntoIterator<Item = &'a Powerup>,
) -> String {
  let mut buffer = String::new();
  for snake in snakes {
    push_record(&mut buffer, &SnakeRecord::from(snake));
  }
  for powerup in powerups {
    push_record(&mut buffer, &PowerupRecord::from(powerup));
  }
  buffer
}
