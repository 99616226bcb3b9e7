//! HTTP routes for the live view surface.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_live_profile, ingest_event, live_health, LiveAppState};

/// Creates the live view router with all routes.
pub fn live_routes(state: LiveAppState) -> Router {
    Router::new()
        // GET /health/live
        .route("/health/live", get(live_health))
        // GET /api/live/:entity_type/:entity_id/profile
        .route("/api/live/:entity_type/:entity_id/profile", get(get_live_profile))
        // POST /api/live/events
        .route("/api/live/events", post(ingest_event))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::load::FixedLoad;
    use crate::adapters::websocket::RoomManager;
    use crate::application::{AdaptiveScheduler, BroadcastRouter, ProfileCacheManager};
    use crate::domain::foundation::{ActorId, DomainError, DomainEvent, EntityId, EntityType, ErrorCode};
    use crate::domain::live::SchedulerSettings;
    use crate::ports::{CacheStore, CacheStoreError, DashboardAggregator, ProfileLoader};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value as JsonValue};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct Loader;

    #[async_trait]
    impl ProfileLoader for Loader {
        async fn load(&self, _: EntityType, id: &EntityId) -> Result<JsonValue, DomainError> {
            if id.as_str() == "missing" {
                return Err(DomainError::new(ErrorCode::EntityNotFound, "no such seller"));
            }
            Ok(json!({ "id": id.as_str(), "status": "active" }))
        }
    }

    struct Aggregator;

    #[async_trait]
    impl DashboardAggregator for Aggregator {
        async fn compute(&self) -> Result<JsonValue, DomainError> {
            Ok(json!({}))
        }
    }

    struct DownStore;

    #[async_trait]
    impl CacheStore for DownStore {
        async fn get(&self, _: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
            Ok(None)
        }
        async fn set(&self, _: &str, _: Vec<u8>, _: Duration) -> Result<(), CacheStoreError> {
            Ok(())
        }
        async fn delete_pattern(&self, _: &str) -> Result<u64, CacheStoreError> {
            Ok(0)
        }
        async fn ping(&self) -> Result<(), CacheStoreError> {
            Err(CacheStoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn state_with(store: Arc<dyn CacheStore>) -> LiveAppState {
        state_with_bus(store, Arc::new(InMemoryEventBus::recording()))
    }

    fn state_with_bus(store: Arc<dyn CacheStore>, bus: Arc<InMemoryEventBus>) -> LiveAppState {
        let profiles = Arc::new(ProfileCacheManager::new(store.clone(), Arc::new(Loader)));
        let router = Arc::new(BroadcastRouter::new(
            Arc::new(RoomManager::default()),
            profiles.clone(),
        ));
        let scheduler = Arc::new(AdaptiveScheduler::new(
            Arc::new(Aggregator),
            router,
            Arc::new(FixedLoad::new(0)),
            Duration::from_secs(2),
        ));
        LiveAppState {
            scheduler,
            cache_store: store,
            profiles,
            events: bus,
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, JsonValue) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok_with_scheduler_state() {
        let state = state_with(Arc::new(InMemoryCacheStore::new()));
        state.scheduler.start(SchedulerSettings::default()).await.unwrap();

        let (status, body) = get_json(live_routes(state.clone()), "/health/live").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["broadcastIntervalMs"], 30_000);
        assert_eq!(body["schedulerState"], "running");
        assert_eq!(body["cacheStore"]["healthy"], true);
        state.scheduler.stop().await;
    }

    #[tokio::test]
    async fn health_is_503_when_cache_ping_fails() {
        let state = state_with(Arc::new(DownStore));

        let (status, body) = get_json(live_routes(state), "/health/live").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["schedulerState"], "stopped");
        assert_eq!(body["cacheStore"]["healthy"], false);
    }

    #[tokio::test]
    async fn profile_route_returns_lookup() {
        let state = state_with(Arc::new(InMemoryCacheStore::new()));

        let (status, body) = get_json(live_routes(state), "/api/live/seller/s1/profile").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fromCache"], false);
        assert_eq!(body["profile"]["data"]["status"], "active");
    }

    #[tokio::test]
    async fn profile_route_rejects_unknown_entity_type() {
        let state = state_with(Arc::new(InMemoryCacheStore::new()));

        let (status, body) = get_json(live_routes(state), "/api/live/invoice/1/profile").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn profile_route_is_503_when_unavailable() {
        let state = state_with(Arc::new(InMemoryCacheStore::new()));

        let (status, body) = get_json(live_routes(state), "/api/live/seller/missing/profile").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "PROFILE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn posted_event_is_emitted_on_the_bus() {
        let bus = Arc::new(InMemoryEventBus::recording());
        let state = state_with_bus(Arc::new(InMemoryCacheStore::new()), bus.clone());
        let event = DomainEvent::status_changed(
            EntityType::Seller,
            EntityId::new("s1").unwrap(),
            ActorId::new("admin-1").unwrap(),
        );

        let response = live_routes(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/live/events")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&event).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["eventId"], event.event_id.as_str());
        assert_eq!(body["eventType"], "seller.status.changed");
        assert_eq!(bus.published_events(), vec![event]);
    }

    #[tokio::test]
    async fn event_with_blank_ids_is_rejected_before_the_bus() {
        let bus = Arc::new(InMemoryEventBus::recording());
        let state = state_with_bus(Arc::new(InMemoryCacheStore::new()), bus.clone());
        let mut body = serde_json::to_value(DomainEvent::status_changed(
            EntityType::Seller,
            EntityId::new("s1").unwrap(),
            ActorId::new("admin-1").unwrap(),
        ))
        .unwrap();
        body["entityId"] = JsonValue::from("   ");
        body["actorId"] = JsonValue::from("");

        let response = live_routes(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/live/events")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn malformed_event_is_rejected_before_the_bus() {
        let bus = Arc::new(InMemoryEventBus::recording());
        let state = state_with_bus(Arc::new(InMemoryCacheStore::new()), bus.clone());

        let response = live_routes(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/live/events")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"entityType":"seller"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(bus.event_count(), 0);
    }
}
