//! Event infrastructure for mutation notifications.
//!
//! This module provides the core types that flow through event ingestion:
//! - `EventId` - Unique identifier for events (deduplication, log correlation)
//! - `EventMetadata` - Tracing and correlation context
//! - `MutationKind` - What happened to the entity
//! - `DomainEvent` - Immutable record emitted by a mutation producer after persistence

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{ActorId, EntityId, EntityType, Timestamp};

/// Routing key that matches every event type.
pub const WILDCARD_EVENT_TYPE: &str = "*";

/// Unique identifier for events.
///
/// Unlike other IDs in the system, EventId uses a String internally
/// to allow for various ID formats (UUID, ULID, etc.) while maintaining
/// serializability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for tracing and correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// ID linking related events across a single admin request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Distributed tracing span/trace ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// What a mutation did to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Created,
    Updated,
    StatusChanged,
    Deleted,
}

impl MutationKind {
    /// Suffix used in routing keys (`seller.status.changed`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Created => "created",
            MutationKind::Updated => "updated",
            MutationKind::StatusChanged => "status.changed",
            MutationKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation notification emitted after a successful write.
///
/// Immutable once emitted. Every subscriber of event ingestion receives it
/// at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    /// Unique ID for this event instance.
    pub event_id: EventId,

    /// What happened.
    pub kind: MutationKind,

    /// Kind of record that changed.
    pub entity_type: EntityType,

    /// Id of the record that changed.
    pub entity_id: EntityId,

    /// Administrator who made the change.
    pub actor_id: ActorId,

    /// When the change was persisted.
    pub occurred_at: Timestamp,

    /// Precomputed data the producer already had, used when the profile
    /// cannot be re-read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_hint: Option<JsonValue>,

    /// Tracing and correlation metadata.
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl DomainEvent {
    /// Creates a new event stamped with a fresh id and the current time.
    pub fn new(
        kind: MutationKind,
        entity_type: EntityType,
        entity_id: EntityId,
        actor_id: ActorId,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            kind,
            entity_type,
            entity_id,
            actor_id,
            occurred_at: Timestamp::now(),
            payload_hint: None,
            metadata: EventMetadata::default(),
        }
    }

    /// Shorthand for an `EntityStatusChanged` event.
    pub fn status_changed(entity_type: EntityType, entity_id: EntityId, actor_id: ActorId) -> Self {
        Self::new(MutationKind::StatusChanged, entity_type, entity_id, actor_id)
    }

    /// Routing key subscribers register for, e.g. `seller.status.changed`.
    pub fn event_type(&self) -> String {
        format!("{}.{}", self.entity_type.as_str(), self.kind.as_str())
    }

    /// Attach data the producer already computed.
    pub fn with_payload_hint(mut self, hint: JsonValue) -> Self {
        self.payload_hint = Some(hint);
        self
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    /// Add trace ID for distributed tracing.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.trace_id = Some(id.into());
        self
    }
}
