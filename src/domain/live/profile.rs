//! Live profile value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{EntityId, EntityType, Timestamp};

/// Current denormalized view of one entity, as shown on live dashboards.
///
/// `data` is the store's canonical document for the entity; this subsystem
/// never interprets it beyond passing it through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub data: JsonValue,
    pub loaded_at: Timestamp,
}

impl Profile {
    /// Creates a profile stamped with the current time.
    pub fn new(entity_type: EntityType, entity_id: EntityId, data: JsonValue) -> Self {
        Self {
            entity_type,
            entity_id,
            data,
            loaded_at: Timestamp::now(),
        }
    }

    /// Serialized form stored in the cache.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse a cached value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Result of a profile read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLookup {
    pub profile: Profile,
    /// True when served from the cache without touching the store.
    pub from_cache: bool,
}
