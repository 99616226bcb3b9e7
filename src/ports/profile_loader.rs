//! ProfileLoader port - canonical profile reads from the document store.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, EntityId, EntityType};

/// Port for fetching the canonical document of an entity.
///
/// Called on every profile cache miss, so implementations should issue a
/// single point read and nothing else.
#[async_trait]
pub trait ProfileLoader: Send + Sync {
    /// Load the current document for the entity.
    ///
    /// # Errors
    ///
    /// - `EntityNotFound` if no such entity exists
    /// - `StoreError` on any store failure
    async fn load(&self, entity_type: EntityType, entity_id: &EntityId) -> Result<JsonValue, DomainError>;
}
