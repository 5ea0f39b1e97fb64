use crate::game::types::EntityId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

/// Frames a session may have queued before it counts as stalled.
pub const OUTBOUND_QUEUE_FRAMES: usize = 64;

#[derive(Debug)]
struct SessionEntry {
    sender: Sender<String>,
}

/// Connected clients keyed by session id. Ids are handed out in increasing order
/// and double as the id of the session's snake.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<EntityId, SessionEntry>,
    next_session_id: AtomicU32,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outbound channel. `greeting` builds the first payload for the
    /// assigned id; it is queued before the session becomes visible to broadcasts.
    pub fn register(
        &self,
        sender: Sender<String>,
        greeting: impl FnOnce(EntityId) -> String,
    ) -> Option<EntityId> {
        let session_id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        if sender.try_send(greeting(session_id)).is_err() {
            return None;
        }
        self.sessions.insert(session_id, SessionEntry { sender });
        Some(session_id)
    }

    pub fn remove(&self, session_id: EntityId) -> bool {
        self.sessions.remove(&session_id).is_some()
    }

    pub fn contains(&self, session_id: EntityId) -> bool {
        self.sessions.contains_key(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Queues `payload` for every session without waiting. Sessions whose writer has gone
    /// away, or whose queue is full, are unregistered and returned.
    pub fn broadcast(&self, payload: &str) -> Vec<EntityId> {
        let stale: Vec<(EntityId, &'static str)> = self
            .sessions
            .iter()
            .filter_map(|entry| match entry.value().sender.try_send(payload.to_string()) {
                Ok(()) => None,
                Err(TrySendError::Full(_)) => Some((*entry.key(), "outbound queue full")),
                Err(TrySendError::Closed(_)) => Some((*entry.key(), "writer closed")),
            })
            .collect();
        stale
            .into_iter()
            .map(|(session_id, reason)| {
                tracing::warn!(session_id, reason, "dropping session after failed send");
                self.remove(session_id);
                session_id
            })
            .collect()
    }
}
