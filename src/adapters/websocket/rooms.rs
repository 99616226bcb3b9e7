//! Channel room management for admin session fan-out.
//!
//! Each connected session owns a bounded outbox; rooms map a channel name
//! to the sessions joined to it. A session may sit in many rooms at once.
//!
//! # Architecture
//!
//! ```text
//! Room: admin-dashboard     Room: admin-seller-42    Room: seller-42
//! ├── session-a             ├── session-a            └── session-d
//! ├── session-b             └── session-c
//! └── session-c
//! ```
//!
//! When seller 42 changes, `admin-seller-42` reaches a and c, `seller-42`
//! reaches d; nobody else sees the entity payload.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::SessionId;
use crate::ports::{SessionRegistry, SessionRegistryError};

use super::messages::ChannelEvent;

/// Default per-session outbox capacity.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 128;

/// Manages channel rooms for connected admin sessions.
///
/// Provides:
/// - Session connect/disconnect
/// - Channel join/leave
/// - Emit to every session in a channel
/// - Automatic cleanup of empty rooms
///
/// # Thread Safety
///
/// Uses `RwLock` for both maps since emits (reads) vastly outnumber
/// joins/leaves (writes). When both locks are held, `sessions` is taken
/// first, so a join can never slip a departed session back into a room.
pub struct RoomManager {
    /// Map of session_id → outbox sender.
    sessions: RwLock<HashMap<SessionId, mpsc::Sender<ChannelEvent>>>,

    /// Map of channel → joined sessions.
    rooms: RwLock<HashMap<String, HashSet<SessionId>>>,

    /// Outbox capacity for each session.
    outbox_capacity: usize,
}

impl RoomManager {
    /// Create a new room manager with specified outbox capacity.
    ///
    /// A session whose outbox is full misses emits until it drains.
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Create with default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_OUTBOX_CAPACITY)
    }

    /// Register a new session and return the receiving end of its outbox.
    pub async fn connect(&self) -> (SessionId, mpsc::Receiver<ChannelEvent>) {
        let session_id = SessionId::new();
        let (tx, rx) = mpsc::channel(self.outbox_capacity);
        self.sessions.write().await.insert(session_id, tx);

        tracing::debug!(session_id = %session_id, "Session connected");
        (session_id, rx)
    }

    /// Remove a session from every room and drop its outbox.
    pub async fn disconnect(&self, session_id: &SessionId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        self.remove_from_rooms(session_id).await;
        drop(sessions);

        tracing::debug!(session_id = %session_id, "Session disconnected");
    }

    /// Channels the session is currently joined to (sorted).
    pub async fn channels_of(&self, session_id: &SessionId) -> Vec<String> {
        let rooms = self.rooms.read().await;
        let mut channels: Vec<String> = rooms
            .iter()
            .filter(|(_, members)| members.contains(session_id))
            .map(|(channel, _)| channel.clone())
            .collect();
        channels.sort();
        channels
    }

    /// Get all active room names (for monitoring/debugging).
    pub async fn active_rooms(&self) -> Vec<String> {
        self.rooms.read().await.keys().cloned().collect()
    }

    /// Get total count of connected sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn remove_from_rooms(&self, session_id: &SessionId) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(session_id);
            !members.is_empty()
        });
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl SessionRegistry for RoomManager {
    async fn join(&self, session_id: &SessionId, channel: &str) -> Result<(), SessionRegistryError> {
        let sessions = self.sessions.read().await;
        if !sessions.contains_key(session_id) {
            return Err(SessionRegistryError::SessionNotFound(*session_id));
        }

        self.rooms
            .write()
            .await
            .entry(channel.to_string())
            .or_default()
            .insert(*session_id);
        drop(sessions);

        tracing::debug!(session_id = %session_id, channel, "Joined channel");
        Ok(())
    }

    async fn leave(&self, session_id: &SessionId, channel: &str) -> Result<(), SessionRegistryError> {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(channel) {
            members.remove(session_id);
            if members.is_empty() {
                rooms.remove(channel);
            }
        }
        Ok(())
    }

    async fn leave_all(&self, session_id: &SessionId) -> Result<(), SessionRegistryError> {
        self.remove_from_rooms(session_id).await;
        Ok(())
    }

    async fn emit_to_channel(
        &self,
        channel: &str,
        event_name: &str,
        payload: JsonValue,
    ) -> Result<usize, SessionRegistryError> {
        let members: Vec<SessionId> = match self.rooms.read().await.get(channel) {
            Some(members) => members.iter().copied().collect(),
            None => return Ok(0),
        };

        let event = ChannelEvent::new(channel, event_name, payload);
        let sessions = self.sessions.read().await;

        let mut reached = 0;
        for session_id in members {
            let Some(outbox) = sessions.get(&session_id) else {
                continue;
            };
            match outbox.try_send(event.clone()) {
                Ok(()) => reached += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        session_id = %session_id,
                        channel,
                        "Session outbox full, dropping event"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(session_id = %session_id, channel, "Session outbox closed");
                }
            }
        }

        Ok(reached)
    }

    async fn member_count(&self, channel: &str) -> Result<usize, SessionRegistryError> {
        Ok(self
            .rooms
            .read()
            .await
            .get(channel)
            .map(HashSet::len)
            .unwrap_or(0))
    }
}
