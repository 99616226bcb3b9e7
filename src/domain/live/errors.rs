//! Failure kinds of the live view subsystem.
//!
//! | Kind | Surfaced to | Effect |
//! |------|-------------|--------|
//! | `ProfileUnavailable` | direct read path | caller renders a degraded view |
//! | `InvalidationFailed` | logs only | stale until TTL expiry |
//! | `PublishFailed` | logs only, per target | sibling targets still published |
//! | `SchedulerTickFailed` | logs only | tick skipped, schedule continues |
//!
//! None of them ever reaches the mutation that triggered the work.

use thiserror::Error;

use crate::domain::foundation::{EntityId, EntityType};

#[derive(Debug, Clone, Error)]
pub enum LiveError {
    /// Neither the cache nor the canonical loader could produce the profile.
    #[error("Profile unavailable for {entity_type} {entity_id}: {reason}")]
    ProfileUnavailable {
        entity_type: EntityType,
        entity_id: EntityId,
        reason: String,
    },

    /// The cache store did not acknowledge a pattern delete.
    #[error("Invalidation of '{pattern}' failed: {reason}")]
    InvalidationFailed { pattern: String, reason: String },

    /// Emitting to one channel failed.
    #[error("Publish to '{channel}' failed: {reason}")]
    PublishFailed { channel: String, reason: String },

    /// The aggregate recompute or its broadcast failed for one tick.
    #[error("Scheduler tick failed: {reason}")]
    SchedulerTickFailed { reason: String },
}

impl LiveError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LiveError::ProfileUnavailable { .. } => "profile_unavailable",
            LiveError::InvalidationFailed { .. } => "invalidation_failed",
            LiveError::PublishFailed { .. } => "publish_failed",
            LiveError::SchedulerTickFailed { .. } => "scheduler_tick_failed",
        }
    }
}
