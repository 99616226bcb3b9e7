//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the live view core to external systems:
//! - `cache` - Cache stores (in-memory, Redis)
//! - `events` - Event bus implementations
//! - `http` - Liveness and profile routes
//! - `load` - Load signals for the adaptive scheduler
//! - `standalone` - Loader and aggregator for running without a host store
//! - `websocket` - Channel rooms and the admin socket endpoint

pub mod cache;
pub mod events;
pub mod http;
pub mod load;
pub mod standalone;
pub mod websocket;

pub use cache::{InMemoryCacheStore, RedisCacheStore};
pub use events::InMemoryEventBus;
pub use load::{ChannelMemberLoad, FixedLoad};
pub use standalone::{DetachedProfileLoader, SessionSnapshotAggregator};
pub use websocket::RoomManager;
