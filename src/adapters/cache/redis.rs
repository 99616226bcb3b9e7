//! Redis-backed cache store for production deployments.
//!
//! Values are written with a millisecond expiry (`SET .. PX`), so Redis
//! enforces the TTL. Pattern deletes walk the keyspace with `SCAN MATCH`
//! and remove each batch with a pipelined `DEL`; `KEYS` is never used.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::ports::{CacheStore, CacheStoreError};

/// Keys requested per `SCAN` step.
const SCAN_BATCH: usize = 100;

/// Redis cache store shared by every server instance.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
}

impl RedisCacheStore {
    /// Create a store over an existing connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Open a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, CacheStoreError> {
        let client = redis::Client::open(url)
            .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheStoreError> {
        let mut conn = self.conn.clone();
        let ttl_ms = ttl.as_millis().max(1) as u64;

        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheStoreError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))?;

            if !keys.is_empty() {
                let mut pipe = redis::pipe();
                for key in &keys {
                    pipe.del(key);
                }
                let counts: Vec<u64> = pipe
                    .query_async(&mut conn)
                    .await
                    .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))?;
                removed += counts.iter().sum::<u64>();
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        tracing::debug!(pattern, removed, "Cache pattern delete");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), CacheStoreError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheStoreError::Unavailable(e.to_string()))?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheStoreError::Protocol(format!("PING answered '{}'", reply)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let result = RedisCacheStore::connect("not a url").await;
        assert!(matches!(result, Err(CacheStoreError::Unavailable(_))));
    }
}
