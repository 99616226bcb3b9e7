//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the admin live view.

mod entity_type;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use entity_type::EntityType;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventId, EventMetadata, MutationKind, WILDCARD_EVENT_TYPE};
pub use ids::{ActorId, EntityId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
