//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ADMIN_LIVE` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working
//! single-instance setup (in-memory cache).
//!
//! # Example
//!
//! ```no_run
//! use admin_live::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod broadcast;
mod cache;
mod error;
mod redis;
mod scheduler;
mod server;

pub use broadcast::BroadcastConfig;
pub use cache::{CacheBackend, CacheConfig};
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use scheduler::SchedulerConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration (shared cache)
    #[serde(default)]
    pub redis: RedisConfig,

    /// Profile cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Adaptive dashboard schedule
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Session fan-out
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ADMIN_LIVE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ADMIN_LIVE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ADMIN_LIVE__CACHE__BACKEND=redis` -> `cache.backend = redis`
    /// - `ADMIN_LIVE__SCHEDULER__LOAD_THRESHOLD=50` -> `scheduler.load_threshold = 50`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("ADMIN_LIVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Redis settings are only checked when Redis backs the cache.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if self.cache.backend == CacheBackend::Redis {
            self.redis.validate()?;
        }
        self.cache.validate()?;
        self.scheduler.validate()?;
        self.broadcast.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
