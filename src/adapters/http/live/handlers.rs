//! HTTP handlers for the live view surface.
//!
//! - `GET /health/live` - scheduler and cache store liveness
//! - `GET /api/live/:entity_type/:entity_id/profile` - direct profile read
//! - `POST /api/live/events` - mutation events from out-of-process producers

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{AdaptiveScheduler, ProfileCacheManager};
use crate::domain::foundation::{DomainEvent, EntityId, EntityType};
use crate::domain::live::{LiveError, ProfileLookup};
use crate::ports::{CacheStore, EventPublisher};

use super::dto::{CacheStoreHealth, ErrorResponse, EventAccepted, LiveHealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

/// Live API error that implements IntoResponse.
pub enum LiveApiError {
    BadRequest(String),
    Unavailable(String),
}

impl IntoResponse for LiveApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            LiveApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            LiveApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::unavailable(msg))
            }
        };
        (status, Json(error)).into_response()
    }
}

impl From<LiveError> for LiveApiError {
    fn from(error: LiveError) -> Self {
        LiveApiError::Unavailable(error.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the live view routes.
#[derive(Clone)]
pub struct LiveAppState {
    pub scheduler: Arc<AdaptiveScheduler>,
    pub cache_store: Arc<dyn CacheStore>,
    pub profiles: Arc<ProfileCacheManager>,
    pub events: Arc<dyn EventPublisher>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health/live
///
/// 200 when the cache store answers its ping, 503 otherwise.
pub async fn live_health(State(state): State<LiveAppState>) -> impl IntoResponse {
    let bound = state.profiles.config().call_timeout;
    let ping = match tokio::time::timeout(bound, state.cache_store.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("ping timed out after {}ms", bound.as_millis())),
    };

    let scheduler = state.scheduler.status();
    let healthy = ping.is_ok();
    let body = LiveHealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        broadcast_interval_ms: scheduler.current_interval_ms,
        scheduler_state: scheduler.state,
        ticks_completed: scheduler.ticks_completed,
        ticks_failed: scheduler.ticks_failed,
        cache_store: CacheStoreHealth {
            healthy,
            error: ping.err(),
        },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// GET /api/live/:entity_type/:entity_id/profile
///
/// Returns the live profile; 503 when neither cache nor store can produce it.
pub async fn get_live_profile(
    State(state): State<LiveAppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Json<ProfileLookup>, LiveApiError> {
    let entity_type: EntityType = entity_type
        .parse()
        .map_err(|_| LiveApiError::BadRequest(format!("Unknown entity type: {}", entity_type)))?;
    let entity_id = EntityId::new(entity_id)
        .map_err(|e| LiveApiError::BadRequest(e.to_string()))?;

    let lookup = state.profiles.get_profile(entity_type, &entity_id).await?;
    Ok(Json(lookup))
}

/// POST /api/live/events
///
/// Emits the event on the bus. Returns once cache invalidation is done;
/// fan-out continues in the background.
pub async fn ingest_event(
    State(state): State<LiveAppState>,
    Json(event): Json<DomainEvent>,
) -> (StatusCode, Json<EventAccepted>) {
    let accepted = EventAccepted {
        event_id: event.event_id.as_str().to_string(),
        event_type: event.event_type(),
    };
    tracing::debug!(event_id = %accepted.event_id, event_type = %accepted.event_type, "Event received over HTTP");

    state.events.publish(event).await;
    (StatusCode::ACCEPTED, Json(accepted))
}
