//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Profile TTL must be between 1 and 3600 seconds")]
    InvalidProfileTtl,

    #[error("Cache call timeout must be between 1 and 30000 ms")]
    InvalidCallTimeout,

    #[error("Invalid scheduler settings: {0}")]
    InvalidSchedule(String),

    #[error("Outbox capacity must be between 1 and 10000")]
    InvalidOutboxCapacity,
}
