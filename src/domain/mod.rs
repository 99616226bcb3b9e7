//! Domain layer containing the live view's rules and value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors, events)
//! - `live` - Cache keys, broadcast targets, profiles and the adaptive schedule

pub mod foundation;
pub mod live;
