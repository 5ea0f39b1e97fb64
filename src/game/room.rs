use super::constants::SURVIVAL_SCORE_INTERVAL;
use super::snake::{change_direction, move_snake, test_collision};
use super::types::{EntityId, Powerup, Snake};
use super::world::World;
use crate::app::settings::GameSettings;
use crate::protocol::{self, ClientMessage};
use crate::shared::names::sanitize_player_name;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

mod session;

pub use session::{SessionRegistry, OUTBOUND_QUEUE_FRAMES};

#[derive(Debug)]
pub enum RoomCommand {
  Client {
    session_id: EntityId,
    message: ClientMessage,
  },
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RoomStats {
  pub tick: u64,
  pub sessions: usize,
  pub snakes: usize,
  #[serde(rename = "deadSnakes")]
  pub dead_snakes: usize,
  pub powerups: usize,
}

/// Handle shared by session tasks. The world itself lives in the tick task; sessions
/// only enqueue commands and manage their own registry entry.
#[derive(Debug)]
pub struct Room {
  settings: Arc<GameSettings>,
  sessions: Arc<SessionRegistry>,
  commands: UnboundedSender<RoomCommand>,
  stats: watch::Receiver<RoomStats>,
}

impl Room {
  /// Builds the arena and starts its tick loop on the current runtime.
  pub fn start(settings: GameSettings) -> Arc<Self> {
    let settings = Arc::new(settings);
    let sessions = Arc::new(SessionRegistry::new());
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (stats_tx, stats) = watch::channel(RoomStats::default());

    let state = RoomState::new(Arc::clone(&settings), Arc::clone(&sessions));
    tokio::spawn(run_tick_loop(state, command_rx, stats_tx));

    Arc::new(Self {
      settings,
      sessions,
      commands,
      stats,
    })
  }

  /// Queues the handshake on `sender` and registers it for broadcasts.
  pub fn add_session(&self, sender: Sender<String>) -> Option<EntityId> {
    let settings = &self.settings;
    let session_id = self.sessions.register(sender, |session_id| {
      protocol::encode_handshake(session_id, settings.universe_size, &settings.walls)
    })?;
    tracing::info!(session_id, "client connected");
    Some(session_id)
  }

  pub fn remove_session(&self, session_id: EntityId) {
    if self.sessions.remove(session_id) {
      tracing::info!(session_id, "client disconnected");
    }
  }

  pub fn handle_text_message(&self, session_id: EntityId, text: &str) {
    let message = protocol::decode_client_line(text);
    let _ = self.commands.send(RoomCommand::Client {
      session_id,
      message,
    });
  }

  pub fn stats(&self) -> RoomStats {
    *self.stats.borrow()
  }
}

async fn run_tick_loop(
  mut state: RoomState,
  mut commands: UnboundedReceiver<RoomCommand>,
  stats: watch::Sender<RoomStats>,
) {
  let mut interval = tokio::time::interval(state.settings.frame_period());
  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    interval.tick().await;
    loop {
      match commands.try_recv() {
        Ok(command) => state.apply_command(command),
        Err(TryRecvError::Empty) => break,
        Err(TryRecvError::Disconnected) => {
          tracing::debug!("room handle dropped, stopping tick loop");
          return;
        }
      }
    }
    state.tick();
    let _ = stats.send(state.stats());
  }
}

#[derive(Debug)]
struct RoomState {
  settings: Arc<GameSettings>,
  sessions: Arc<SessionRegistry>,
  world: World,
  frame: u32,
  tick: u64,
}

impl RoomState {
  fn new(settings: Arc<GameSettings>, sessions: Arc<SessionRegistry>) -> Self {
    let world = World::new(settings.universe_size as f64, settings.walls.iter().copied());
    Self {
      settings,
      sessions,
      world,
      frame: 0,
      tick: 0,
    }
  }

  fn apply_command(&mut self, command: RoomCommand) {
    match command {
      RoomCommand::Client {
        session_id,
        message,
      } => match message {
        ClientMessage::Move(direction) => {
          let Some(heading) = direction.heading() else { return };
          let Some(snake) = self.world.snakes.get_mut(&session_id) else { return };
          change_direction(snake, heading);
        }
        ClientMessage::Join(name) => self.handle_join(session_id, &name),
      },
    }
  }

  fn handle_join(&mut self, session_id: EntityId, name: &str) {
    if !self.sessions.contains(session_id) || self.world.has_snake(session_id) {
      return;
    }
    let name = sanitize_player_name(name);
    tracing::debug!(session_id, name = %name, "snake joined");
    self.world.join_snake(session_id, name);
  }

  fn tick(&mut self) {
    self.tick += 1;
    self.frame = (self.frame + 1) % SURVIVAL_SCORE_INTERVAL;
    let survival_mode = self.settings.survival_mode;

    self.world.maybe_spawn_powerup(survival_mode);
    self.world.purge_consumed_powerups();

    // A snake that died last tick has been broadcast once with `died` set; retire it now.
    for id in self.world.snake_ids() {
      let Some(snake) = self.world.snakes.get_mut(&id) else { continue };
      if survival_mode && self.frame == 0 {
        snake.score += 1;
      }
      if snake.died {
        self.world.retire_snake(id, self.settings.respawn_rate);
        continue;
      }
      move_snake(snake, survival_mode);
      test_collision(&mut self.world, id);
    }

    self.drop_orphaned_dead_snakes();
    self.world.advance_respawns();
    self.mark_disconnected();
    self.broadcast_state();
    self.finish_frame();
  }

  fn mark_disconnected(&mut self) {
    let sessions = &self.sessions;
    for snake in self.world.snakes.values_mut() {
      if !sessions.contains(snake.id) {
        snake.disconnected = true;
      }
    }
  }

  // Dead snakes are never broadcast, so one whose session left is dropped outright.
  fn drop_orphaned_dead_snakes(&mut self) {
    let sessions = &self.sessions;
    self.world.dead_snakes.retain(|id, _| {
      if sessions.contains(*id) {
        return true;
      }
      tracing::debug!(snake_id = *id, "dropped dead snake of a closed session");
      false
    });
  }

  fn broadcast_state(&self) {
    if self.sessions.is_empty() {
      return;
    }
    let snakes: Vec<&Snake> = self
      .world
      .snake_ids()
      .iter()
      .filter_map(|id| self.world.snakes.get(id))
      .collect();
    let mut powerups: Vec<&Powerup> = self.world.powerups.values().collect();
    powerups.sort_unstable_by_key(|powerup| powerup.id);

    let payload = protocol::encode_frame(snakes, powerups);
    self.sessions.broadcast(&payload);
  }

  // Disconnected snakes leave right after the broadcast that carried `dc`.
  fn finish_frame(&mut self) {
    self.world.snakes.retain(|id, snake| {
      if snake.disconnected {
        tracing::debug!(snake_id = *id, "removed disconnected snake");
        return false;
      }
      true
    });
    for snake in self.world.snakes.values_mut() {
      snake.just_joined = false;
    }
  }

  fn stats(&self) -> RoomStats {
    RoomStats {
      tick: self.tick,
      sessions: self.sessions.len(),
      snakes: self.world.snakes.len(),
      dead_snakes: self.world.dead_snakes.len(),
      powerups: self.world.powerups.len(),
    }
  }
}
