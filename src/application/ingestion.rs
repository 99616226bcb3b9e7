//! Core subscribers of mutation events.
//!
//! Registered once, in this order, on every event type:
//!
//! 1. `CacheInvalidationHandler` awaits the cache delete, so the mutation
//!    does not complete until stale profiles are gone.
//! 2. `EntityBroadcastHandler` spawns the fan-out and returns immediately;
//!    the producer never waits on subscribers' sockets.
//!
//! The order is what guarantees the broadcast's profile fetch misses the
//! cache and reads the post-mutation document.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, DomainEvent, WILDCARD_EVENT_TYPE};
use crate::ports::{EventHandler, EventSubscriber};

use super::broadcast_router::BroadcastRouter;
use super::profile_cache::ProfileCacheManager;

/// Drops every cached facet of the mutated entity.
pub struct CacheInvalidationHandler {
    profiles: Arc<ProfileCacheManager>,
}

impl CacheInvalidationHandler {
    pub fn new(profiles: Arc<ProfileCacheManager>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl EventHandler for CacheInvalidationHandler {
    async fn handle(&self, event: DomainEvent) -> Result<(), DomainError> {
        // Failures are logged inside invalidate; the entry ages out via TTL.
        self.profiles
            .invalidate(event.entity_type, &event.entity_id)
            .await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CacheInvalidationHandler"
    }
}

/// Fans the mutation out to its three channels in a detached task.
pub struct EntityBroadcastHandler {
    router: Arc<BroadcastRouter>,
}

impl EntityBroadcastHandler {
    pub fn new(router: Arc<BroadcastRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventHandler for EntityBroadcastHandler {
    async fn handle(&self, event: DomainEvent) -> Result<(), DomainError> {
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            let report = router.broadcast_entity_update(&event).await;
            if !report.is_complete() {
                tracing::warn!(
                    event_id = %report.event_id,
                    failed = report.failures().len(),
                    reached = report.sessions_reached(),
                    "Entity broadcast partially failed"
                );
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EntityBroadcastHandler"
    }
}

/// Register the invalidation and broadcast subscribers on every event type.
pub fn register_core_subscribers(
    subscriber: &dyn EventSubscriber,
    profiles: Arc<ProfileCacheManager>,
    router: Arc<BroadcastRouter>,
) {
    subscriber.subscribe(
        WILDCARD_EVENT_TYPE,
        Arc::new(CacheInvalidationHandler::new(profiles)),
    );
    subscriber.subscribe(
        WILDCARD_EVENT_TYPE,
        Arc::new(EntityBroadcastHandler::new(router)),
    );
}
