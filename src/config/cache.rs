//! Profile cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which cache store backs the profile cache
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local store; fine for a single instance
    #[default]
    Memory,
    /// Shared Redis store
    Redis,
}

/// Profile cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Lifetime of a cached profile in seconds
    #[serde(default = "default_profile_ttl")]
    pub profile_ttl_secs: u64,

    /// Bound on each cache, loader and aggregate call in milliseconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,
}

impl CacheConfig {
    pub fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_ttl_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.profile_ttl_secs == 0 || self.profile_ttl_secs > 3600 {
            return Err(ValidationError::InvalidProfileTtl);
        }
        if self.call_timeout_ms == 0 || self.call_timeout_ms > 30_000 {
            return Err(ValidationError::InvalidCallTimeout);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            profile_ttl_secs: default_profile_ttl(),
            call_timeout_ms: default_call_timeout(),
        }
    }
}

fn default_profile_ttl() -> u64 {
    60
}

fn default_call_timeout() -> u64 {
    2_000
}
