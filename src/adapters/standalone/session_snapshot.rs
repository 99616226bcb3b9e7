use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use crate::adapters::websocket::RoomManager;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::DashboardAggregator;

/// Dashboard snapshot built from the live view's own connection state.
pub struct SessionSnapshotAggregator {
    rooms: Arc<RoomManager>,
}

impl SessionSnapshotAggregator {
    pub fn new(rooms: Arc<RoomManager>) -> Self {
        Self { rooms }
    }
}

#[async_trait]
impl DashboardAggregator for SessionSnapshotAggregator {
    async fn compute(&self) -> Result<JsonValue, DomainError> {
        let mut channels = self.rooms.active_rooms().await;
        channels.sort();
        Ok(json!({
            "connectedSessions": self.rooms.session_count().await,
            "activeChannels": channels,
            "generatedAt": Timestamp::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SessionRegistry;

    #[tokio::test]
    async fn snapshot_counts_sessions_and_sorted_channels() {
        let rooms = Arc::new(RoomManager::default());
        let (a, _rx_a) = rooms.connect().await;
        let (b, _rx_b) = rooms.connect().await;
        rooms.join(&a, "admin-dashboard").await.unwrap();
        rooms.join(&b, "admin-seller-1").await.unwrap();

        let snapshot = SessionSnapshotAggregator::new(rooms).compute().await.unwrap();

        assert_eq!(snapshot["connectedSessions"], 2);
        assert_eq!(snapshot["activeChannels"], json!(["admin-dashboard", "admin-seller-1"]));
        assert!(snapshot["generatedAt"].is_string());
    }
}
