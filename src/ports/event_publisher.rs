//! EventPublisher port - Interface for emitting mutation events.
//!
//! Mutation producers (CRUD handlers) call this after a successful write.
//! The port hides whether delivery is in-process or brokered.

use async_trait::async_trait;

use crate::domain::foundation::DomainEvent;

/// Port for emitting domain events.
///
/// Implementations must ensure:
/// - Every handler registered for the event's type (or the wildcard) has
///   been invoked before `publish` returns
/// - Handler failures never surface to the producer; a failed live-view
///   update must not fail the write that caused it
///
/// # Example
///
/// ```ignore
/// repo.update_status(&seller_id, Status::Active).await?;
/// publisher
///     .publish(DomainEvent::status_changed(EntityType::Seller, seller_id, actor))
///     .await;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Emit a single event.
    async fn publish(&self, event: DomainEvent);

    /// Emit several events in order.
    async fn publish_all(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.publish(event).await;
        }
    }
}
