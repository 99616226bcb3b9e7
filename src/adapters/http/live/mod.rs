//! Live view HTTP adapter module.
//!
//! Provides the liveness endpoint, the direct profile read and HTTP event
//! ingestion.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{CacheStoreHealth, ErrorResponse, EventAccepted, LiveHealthResponse};
pub use handlers::{LiveApiError, LiveAppState};
pub use routes::live_routes;
