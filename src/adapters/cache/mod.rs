//! Cache store adapters.
//!
//! - `InMemoryCacheStore` - Single-process store for development and tests
//! - `RedisCacheStore` - Shared store for multi-server deployments

mod in_memory;
mod redis;

pub use in_memory::InMemoryCacheStore;
pub use redis::RedisCacheStore;
