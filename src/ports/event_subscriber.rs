//! EventSubscriber port - Interface for subscribing to mutation events.
//!
//! Subscriptions are registered once at process start and stay fixed for
//! the lifetime of the process.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, DomainEvent};

/// Handler for processing domain events.
///
/// Implementations should be:
/// - **Idempotent** - Safe to call multiple times with same event
/// - **Quick** - Work the producer should not wait on is detached
/// - **Isolated** - Errors don't affect other handlers
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: DomainEvent) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe("seller.status.changed", audit_trail);
/// subscriber.subscribe(WILDCARD_EVENT_TYPE, cache_invalidation);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type, or to every event with
    /// `WILDCARD_EVENT_TYPE`.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler) {}

    #[allow(dead_code)]
    fn assert_subscriber_object_safe(_: &dyn EventSubscriber) {}
}
