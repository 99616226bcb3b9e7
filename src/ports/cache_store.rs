//! CacheStore port - Interface for the shared key/value cache.
//!
//! The live view only needs three capabilities from the cache: read a key,
//! write a key with a TTL, and delete every key matching a glob pattern.
//! Stores without native pattern deletion must emulate it (for example with
//! a key index maintained alongside writes).

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur in cache store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheStoreError {
    /// Store could not be reached or refused the command.
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with something the adapter could not interpret.
    #[error("Unexpected cache store response: {0}")]
    Protocol(String),

    /// Pattern handed to `delete_pattern` is not a valid glob.
    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),
}

/// Port for the shared cache used by the profile cache manager.
///
/// Implementations should:
/// - Never return a value whose TTL has elapsed
/// - Return only after a `delete_pattern` is acknowledged, so callers can
///   rely on the keys being gone
/// - Be safe to call concurrently from many tasks
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a key. `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError>;

    /// Write a key that expires after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheStoreError>;

    /// Delete every key matching `pattern`. Returns how many were removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheStoreError>;

    /// Round-trip health probe for the liveness surface.
    async fn ping(&self) -> Result<(), CacheStoreError>;
}
