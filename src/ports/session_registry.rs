//! SessionRegistry port - Interface for channel-addressed fan-out.
//!
//! Admin sessions join named channels (`admin-dashboard`,
//! `admin-seller-<id>`, `seller-<id>`). Publishers address channels, never
//! individual sessions, so the core stays agnostic of the transport
//! (WebSocket, SSE, long-poll).
//!
//! ## Use Case
//!
//! 1. Admin opens the dashboard; transport joins their session to `admin-dashboard`
//! 2. Admin opens seller S; transport joins `admin-seller-S`
//! 3. Seller S's status changes; the broadcast router emits to all three
//!    channels of S
//! 4. Whoever is joined at emit time receives the payload; nobody else does

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::SessionId;

/// Errors that can occur in session registry operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionRegistryError {
    /// Backend (broker, remote registry) communication error
    #[error("Registry backend error: {0}")]
    Backend(String),

    /// Session is not known to the registry
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Payload could not be encoded for the transport
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Channel rejected the emit (closed, over capacity)
    #[error("Delivery to channel '{channel}' failed: {reason}")]
    Delivery { channel: String, reason: String },
}

/// Port for joining sessions to channels and emitting to channels.
///
/// Delivery is live-only: sessions not joined at emit time never see the
/// payload, and there is no queueing for later joiners.
///
/// # Example
///
/// ```ignore
/// registry.join(&session_id, "admin-dashboard").await?;
/// let reached = registry
///     .emit_to_channel("admin-dashboard", "dashboard.update", payload)
///     .await?;
/// ```
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Add a session to a channel. Joining twice is a no-op.
    async fn join(&self, session_id: &SessionId, channel: &str) -> Result<(), SessionRegistryError>;

    /// Remove a session from a channel. Leaving a channel not joined is a no-op.
    async fn leave(&self, session_id: &SessionId, channel: &str) -> Result<(), SessionRegistryError>;

    /// Remove a session from every channel (disconnect).
    async fn leave_all(&self, session_id: &SessionId) -> Result<(), SessionRegistryError>;

    /// Emit to every session currently joined to `channel`.
    ///
    /// Returns the number of sessions reached (0 for an empty channel).
    async fn emit_to_channel(
        &self,
        channel: &str,
        event_name: &str,
        payload: JsonValue,
    ) -> Result<usize, SessionRegistryError>;

    /// Number of sessions currently joined to `channel`.
    async fn member_count(&self, channel: &str) -> Result<usize, SessionRegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SessionRegistry) {}

    #[test]
    fn delivery_error_names_channel() {
        let err = SessionRegistryError::Delivery {
            channel: "seller-1".to_string(),
            reason: "outbox full".to_string(),
        };
        assert_eq!(err.to_string(), "Delivery to channel 'seller-1' failed: outbox full");
    }
}
