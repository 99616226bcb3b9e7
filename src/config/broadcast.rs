//! Broadcast transport configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Broadcast transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Queued emits per session before further emits are dropped for it
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

impl BroadcastConfig {
    /// Validate broadcast configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbox_capacity == 0 || self.outbox_capacity > 10_000 {
            return Err(ValidationError::InvalidOutboxCapacity);
        }
        Ok(())
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

fn default_outbox_capacity() -> usize {
    128
}
