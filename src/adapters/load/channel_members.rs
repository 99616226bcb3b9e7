use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::live::DASHBOARD_CHANNEL;
use crate::ports::{LoadSignal, SessionRegistry};

/// Reports the number of sessions joined to one channel.
///
/// Defaults to the dashboard channel: the more admins watching, the more
/// each aggregate recompute costs the store, so the schedule backs off.
pub struct ChannelMemberLoad {
    registry: Arc<dyn SessionRegistry>,
    channel: String,
}

impl ChannelMemberLoad {
    pub fn new(registry: Arc<dyn SessionRegistry>, channel: impl Into<String>) -> Self {
        Self {
            registry,
            channel: channel.into(),
        }
    }

    pub fn dashboard(registry: Arc<dyn SessionRegistry>) -> Self {
        Self::new(registry, DASHBOARD_CHANNEL)
    }
}

#[async_trait]
impl LoadSignal for ChannelMemberLoad {
    async fn current_load(&self) -> Result<u64, DomainError> {
        self.registry
            .member_count(&self.channel)
            .await
            .map(|count| count as u64)
            .map_err(|e| {
                DomainError::new(ErrorCode::InternalError, e.to_string())
                    .with_detail("channel", self.channel.clone())
            })
    }
}
