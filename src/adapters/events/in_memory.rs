//! In-memory event bus.
//!
//! Provides synchronous, deterministic in-process delivery: `publish`
//! returns only after every matching handler's `handle` has returned.
//! Handlers that need to do slow work detach it themselves.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{DomainEvent, WILDCARD_EVENT_TYPE};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// In-memory event bus.
///
/// Features:
/// - Synchronous delivery in registration order
/// - Wildcard (`*`) subscriptions that see every event
/// - Optional event capture for assertions
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::recording());
///
/// bus.subscribe(WILDCARD_EVENT_TYPE, invalidation_handler);
/// bus.publish(event).await;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event("seller.status.changed"));
/// ```
pub struct InMemoryEventBus {
    // Registration order across specific and wildcard subscribers.
    handlers: RwLock<Vec<(String, Arc<dyn EventHandler>)>>,
    published: RwLock<Vec<DomainEvent>>,
    record: bool,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus that does not keep published events.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            published: RwLock::new(Vec::new()),
            record: false,
        }
    }

    /// Creates a bus that keeps every published event for inspection.
    pub fn recording() -> Self {
        Self {
            record: true,
            ..Self::new()
        }
    }

    /// Number of registered subscriptions, counting each event type once.
    pub fn subscription_count(&self) -> usize {
        self.read_handlers().len()
    }

    // === Test Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<DomainEvent> {
        self.read_published().clone()
    }

    /// Returns events with a specific routing key.
    pub fn events_of_type(&self, event_type: &str) -> Vec<DomainEvent> {
        self.read_published()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    /// Returns events for a specific entity id.
    pub fn events_for_entity(&self, entity_id: &str) -> Vec<DomainEvent> {
        self.read_published()
            .iter()
            .filter(|e| e.entity_id.as_str() == entity_id)
            .cloned()
            .collect()
    }

    /// Clears all published events.
    pub fn clear(&self) {
        self.write_published().clear();
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.read_published().len()
    }

    /// Checks if a specific routing key was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.read_published()
            .iter()
            .any(|e| e.event_type() == event_type)
    }

    // A handler panicking while we hold a guard poisons the lock; the data
    // itself is still consistent because no guard spans a handler call.
    fn read_handlers(&self) -> RwLockReadGuard<'_, Vec<(String, Arc<dyn EventHandler>)>> {
        self.handlers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_handlers(&self) -> RwLockWriteGuard<'_, Vec<(String, Arc<dyn EventHandler>)>> {
        self.handlers.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_published(&self) -> RwLockReadGuard<'_, Vec<DomainEvent>> {
        self.published.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_published(&self) -> RwLockWriteGuard<'_, Vec<DomainEvent>> {
        self.published.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) {
        let event_type = event.event_type();

        if self.record {
            self.write_published().push(event.clone());
        }

        // Clone handlers to release lock before await points
        let matching: Vec<Arc<dyn EventHandler>> = self
            .read_handlers()
            .iter()
            .filter(|(key, _)| key == WILDCARD_EVENT_TYPE || *key == event_type)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::debug!(
            event_type = %event_type,
            event_id = %event.event_id,
            handlers = matching.len(),
            "Publishing domain event"
        );

        for handler in matching {
            if let Err(e) = handler.handle(event.clone()).await {
                tracing::warn!(
                    handler = handler.name(),
                    event_type = %event_type,
                    event_id = %event.event_id,
                    error = %e,
                    "Event handler failed"
                );
            }
        }
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        tracing::debug!(event_type, handler = handler.name(), "Subscribing handler");
        self.write_handlers().push((event_type.to_string(), handler));
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self.write_handlers();
        for event_type in event_types {
            handlers.push((event_type.to_string(), Arc::clone(&handler)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ActorId, DomainError, EntityId, EntityType, ErrorCode, MutationKind};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn test_event(kind: MutationKind, entity_type: EntityType, id: &str) -> DomainEvent {
        DomainEvent::new(
            kind,
            entity_type,
            EntityId::new(id).unwrap(),
            ActorId::new("admin-1").unwrap(),
        )
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _: DomainEvent) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct OrderHandler {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl EventHandler for OrderHandler {
        async fn handle(&self, _: DomainEvent) -> Result<(), DomainError> {
            tokio::task::yield_now().await;
            self.log.lock().unwrap().push(self.label);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "OrderHandler"
        }
    }

    #[tokio::test]
    async fn recording_bus_stores_event() {
        let bus = InMemoryEventBus::recording();

        bus.publish(test_event(MutationKind::Updated, EntityType::Seller, "s1"))
            .await;

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("seller.updated"));
    }

    #[tokio::test]
    async fn plain_bus_does_not_retain_events() {
        let bus = InMemoryEventBus::new();

        bus.publish(test_event(MutationKind::Updated, EntityType::Seller, "s1"))
            .await;

        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn events_of_type_filters_correctly() {
        let bus = InMemoryEventBus::recording();

        bus.publish(test_event(MutationKind::Updated, EntityType::Seller, "1"))
            .await;
        bus.publish(test_event(MutationKind::Created, EntityType::Order, "2"))
            .await;
        bus.publish(test_event(MutationKind::Updated, EntityType::Seller, "3"))
            .await;

        assert_eq!(bus.events_of_type("seller.updated").len(), 2);
        assert_eq!(bus.events_for_entity("2").len(), 1);
    }

    #[tokio::test]
    async fn handler_receives_published_event() {
        let bus = InMemoryEventBus::new();
        let received = Arc::new(AtomicBool::new(false));

        struct FlagHandler(Arc<AtomicBool>);

        #[async_trait]
        impl EventHandler for FlagHandler {
            async fn handle(&self, event: DomainEvent) -> Result<(), DomainError> {
                assert_eq!(event.entity_id.as_str(), "s1");
                self.0.store(true, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "FlagHandler"
            }
        }

        bus.subscribe("seller.status.changed", Arc::new(FlagHandler(received.clone())));
        bus.publish(test_event(MutationKind::StatusChanged, EntityType::Seller, "s1"))
            .await;

        assert!(received.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn wildcard_handler_sees_every_event() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe(WILDCARD_EVENT_TYPE, Arc::new(CountingHandler(counter.clone())));

        bus.publish(test_event(MutationKind::Created, EntityType::Customer, "c1"))
            .await;
        bus.publish(test_event(MutationKind::Deleted, EntityType::Order, "o1"))
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscribe_all_registers_for_multiple_types() {
        let bus = InMemoryEventBus::new();
        let received = Arc::new(AtomicUsize::new(0));

        bus.subscribe_all(
            &["seller.created", "seller.updated"],
            Arc::new(CountingHandler(received.clone())),
        );

        bus.publish(test_event(MutationKind::Created, EntityType::Seller, "1"))
            .await;
        bus.publish(test_event(MutationKind::Updated, EntityType::Seller, "2"))
            .await;
        bus.publish(test_event(MutationKind::Deleted, EntityType::Seller, "3"))
            .await; // Not subscribed

        assert_eq!(received.load(Ordering::SeqCst), 2);
        assert_eq!(bus.subscription_count(), 2);
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        let bus = InMemoryEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            WILDCARD_EVENT_TYPE,
            Arc::new(OrderHandler { label: "first", log: log.clone() }),
        );
        bus.subscribe(
            "seller.updated",
            Arc::new(OrderHandler { label: "second", log: log.clone() }),
        );
        bus.subscribe(
            WILDCARD_EVENT_TYPE,
            Arc::new(OrderHandler { label: "third", log: log.clone() }),
        );

        bus.publish(test_event(MutationKind::Updated, EntityType::Seller, "s1"))
            .await;

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn handler_error_does_not_stop_later_handlers() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        struct FailingHandler;

        #[async_trait]
        impl EventHandler for FailingHandler {
            async fn handle(&self, _: DomainEvent) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::InternalError, "Handler failed"))
            }
            fn name(&self) -> &'static str {
                "FailingHandler"
            }
        }

        bus.subscribe(WILDCARD_EVENT_TYPE, Arc::new(FailingHandler));
        bus.subscribe(WILDCARD_EVENT_TYPE, Arc::new(CountingHandler(counter.clone())));

        bus.publish(test_event(MutationKind::Updated, EntityType::Order, "o1"))
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publish_all_publishes_events_and_clear_resets() {
        let bus = InMemoryEventBus::recording();

        bus.publish_all(vec![
            test_event(MutationKind::Created, EntityType::Seller, "1"),
            test_event(MutationKind::Created, EntityType::Customer, "2"),
            test_event(MutationKind::Created, EntityType::Order, "3"),
        ])
        .await;
        assert_eq!(bus.event_count(), 3);

        bus.clear();
        assert_eq!(bus.event_count(), 0);
    }
}
