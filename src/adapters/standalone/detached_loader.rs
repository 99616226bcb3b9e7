use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, EntityId, EntityType, ErrorCode};
use crate::ports::ProfileLoader;

/// Profile loader for a process with no document store attached.
///
/// Every load fails with `StoreError`, so reads report `ProfileUnavailable`
/// and broadcasts carry the event's payload hint instead.
#[derive(Debug, Default)]
pub struct DetachedProfileLoader;

#[async_trait]
impl ProfileLoader for DetachedProfileLoader {
    async fn load(&self, entity_type: EntityType, entity_id: &EntityId) -> Result<JsonValue, DomainError> {
        Err(
            DomainError::new(ErrorCode::StoreError, "No profile store attached")
                .with_detail("entity_type", entity_type.as_str())
                .with_detail("entity_id", entity_id.as_str()),
        )
    }
}
