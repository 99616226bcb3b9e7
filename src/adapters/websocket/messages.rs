//! WebSocket message types for the admin live view.
//!
//! Defines the protocol between server and connected admin clients:
//! - Server → Client: Connection status, channel events, subscription acks, errors, pongs
//! - Client → Server: Subscribe, unsubscribe, ping

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established; the session id is the client's handle.
    Connected(ConnectedMessage),

    /// Something was emitted on a channel the client joined.
    Event(EventMessage),

    /// Channel joined.
    Subscribed(SubscriptionMessage),

    /// Channel left.
    Unsubscribed(SubscriptionMessage),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub session_id: String,
    pub timestamp: String,
}

/// A channel emit as the client sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub channel: String,
    pub event: String,
    pub payload: JsonValue,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionMessage {
    pub channel: String,
}

/// Error message sent to client.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorMessage {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,

    /// Join a channel, e.g. `admin-dashboard` or `admin-seller-42`.
    Subscribe { channel: String },

    /// Leave a channel.
    Unsubscribe { channel: String },
}

// ============================================
// Internal Types
// ============================================

/// Internal representation of a channel emit, queued per session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub channel: String,
    pub event_name: String,
    pub payload: JsonValue,
    pub timestamp: Timestamp,
}

impl ChannelEvent {
    pub fn new(channel: impl Into<String>, event_name: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            channel: channel.into(),
            event_name: event_name.into(),
            payload,
            timestamp: Timestamp::now(),
        }
    }

    /// Convert to a server message for sending to clients.
    pub fn to_server_message(self) -> ServerMessage {
        ServerMessage::Event(EventMessage {
            channel: self.channel,
            event: self.event_name,
            payload: self.payload,
            timestamp: self.timestamp.to_rfc3339(),
        })
    }
}
