//! HTTP adapters - REST API implementations.

pub mod live;

// Re-export key types for convenience
pub use live::{live_routes, LiveAppState};
