//! Adaptive scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::live::SchedulerSettings;

use super::error::ValidationError;

/// Adaptive scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Start the dashboard schedule with the server
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_initial_interval")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,

    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,

    /// Load strictly above this slows the schedule
    #[serde(default = "default_load_threshold")]
    pub load_threshold: u64,

    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Reconfigure timer period in seconds
    #[serde(default = "default_reconfigure_interval")]
    pub reconfigure_interval_secs: u64,
}

impl SchedulerConfig {
    /// Domain settings for the scheduler driver
    pub fn settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            min_interval: Duration::from_millis(self.min_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            load_threshold: self.load_threshold,
            scale_factor: self.scale_factor,
            reconfigure_every: Duration::from_secs(self.reconfigure_interval_secs),
        }
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.settings()
            .validate()
            .map_err(|e| ValidationError::InvalidSchedule(e.to_string()))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            initial_interval_ms: default_initial_interval(),
            min_interval_ms: default_min_interval(),
            max_interval_ms: default_max_interval(),
            load_threshold: default_load_threshold(),
            scale_factor: default_scale_factor(),
            reconfigure_interval_secs: default_reconfigure_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_initial_interval() -> u64 {
    30_000
}

fn default_min_interval() -> u64 {
    10_000
}

fn default_max_interval() -> u64 {
    120_000
}

fn default_load_threshold() -> u64 {
    100
}

fn default_scale_factor() -> f64 {
    1.5
}

fn default_reconfigure_interval() -> u64 {
    300
}
