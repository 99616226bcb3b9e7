//! Response types for the live view HTTP surface.

use serde::Serialize;

use crate::domain::live::SchedulerPhase;

/// Body of `GET /health/live`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveHealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    pub broadcast_interval_ms: u64,
    pub scheduler_state: SchedulerPhase,
    pub ticks_completed: u64,
    pub ticks_failed: u64,
    pub cache_store: CacheStoreHealth,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStoreHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/live/events`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAccepted {
    pub event_id: String,
    pub event_type: String,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: "PROFILE_UNAVAILABLE".to_string(),
            message: message.into(),
            details: None,
        }
    }
}
