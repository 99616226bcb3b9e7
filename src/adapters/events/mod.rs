//! Event bus adapters.
//!
//! Adapters implement the event publishing and subscribing ports:
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus

mod in_memory;

pub use in_memory::InMemoryEventBus;
