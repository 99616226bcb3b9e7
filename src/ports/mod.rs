//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the live view core and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port mutation producers emit through
//! - `EventSubscriber` - Port for registering handlers
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Infrastructure Ports
//!
//! - `CacheStore` - Shared key/value cache with TTL and pattern delete
//! - `SessionRegistry` - Channel membership and channel-addressed emit
//!
//! ## Store Ports
//!
//! - `ProfileLoader` - Canonical entity reads
//! - `DashboardAggregator` - Aggregate dashboard recompute
//! - `LoadSignal` - Load input for the adaptive scheduler

mod cache_store;
mod dashboard_aggregator;
mod event_publisher;
mod event_subscriber;
mod load_signal;
mod profile_loader;
mod session_registry;

pub use cache_store::{CacheStore, CacheStoreError};
pub use dashboard_aggregator::DashboardAggregator;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use load_signal::LoadSignal;
pub use profile_loader::ProfileLoader;
pub use session_registry::{SessionRegistry, SessionRegistryError};
