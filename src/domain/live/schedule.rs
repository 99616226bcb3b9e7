//! Interval arithmetic and lifecycle of the adaptive dashboard schedule.
//!
//! The scheduler driver owns one `SchedulerState`. Nothing else mutates it;
//! `next_interval` is the only rule that moves `current_interval`.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle of the scheduler.
///
/// ```text
/// Stopped ──start──▶ Running ──reconfigure──▶ Reconfiguring
///    ▲                  │  ▲                        │
///    └──────stop────────┘  └────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    #[default]
    Stopped,
    Running,
    Reconfiguring,
}

impl StateMachine for SchedulerPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SchedulerPhase::*;
        matches!(
            (self, target),
            (Stopped, Running) | (Running, Reconfiguring) | (Reconfiguring, Running) | (Running, Stopped)
                | (Reconfiguring, Stopped)
        )
    }
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerPhase::Stopped => "stopped",
            SchedulerPhase::Running => "running",
            SchedulerPhase::Reconfiguring => "reconfiguring",
        };
        f.write_str(s)
    }
}

/// Tuning of the adaptive interval.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    pub initial_interval: Duration,
    pub min_interval: Duration,
    pub max_interval: Duration,
    /// Load strictly above this slows the schedule down.
    pub load_threshold: u64,
    /// Multiplier applied per high-load reconfiguration.
    pub scale_factor: f64,
    /// Period of the reconfiguration timer.
    pub reconfigure_every: Duration,
}

impl SchedulerSettings {
    /// Check the bounds `min ≤ initial ≤ max` and a non-shrinking scale.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_interval.is_zero() {
            return Err(ValidationError::invalid_format("min_interval", "must be positive"));
        }
        if self.min_interval > self.initial_interval || self.initial_interval > self.max_interval {
            return Err(ValidationError::invalid_format(
                "initial_interval",
                "must satisfy min <= initial <= max",
            ));
        }
        if !self.scale_factor.is_finite() || self.scale_factor < 1.0 {
            return Err(ValidationError::invalid_format("scale_factor", "must be >= 1.0"));
        }
        if self.reconfigure_every.is_zero() {
            return Err(ValidationError::invalid_format("reconfigure_every", "must be positive"));
        }
        Ok(())
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(30_000),
            min_interval: Duration::from_millis(10_000),
            max_interval: Duration::from_millis(120_000),
            load_threshold: 100,
            scale_factor: 1.5,
            reconfigure_every: Duration::from_secs(300),
        }
    }
}

/// Interval state owned by the scheduler driver.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    settings: SchedulerSettings,
    current_interval: Duration,
}

impl SchedulerState {
    /// Fresh state at the initial interval. Settings must already be valid.
    pub fn new(settings: SchedulerSettings) -> Self {
        let current_interval = settings.initial_interval;
        Self {
            settings,
            current_interval,
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Interval the next reconfiguration would choose for `load`.
    ///
    /// High load grows the current interval by `scale_factor`, capped at the
    /// maximum. Anything else resets to the initial interval rather than
    /// shrinking step by step.
    pub fn next_interval(&self, load: u64) -> Duration {
        let s = &self.settings;
        let next = if load > s.load_threshold {
            let scaled_ms = (self.current_interval.as_millis() as f64 * s.scale_factor).round();
            let scaled = Duration::from_millis(scaled_ms.min(u64::MAX as f64) as u64);
            scaled.min(s.max_interval)
        } else {
            s.initial_interval
        };
        next.clamp(s.min_interval, s.max_interval)
    }

    /// Apply a load reading. Returns true when the interval changed.
    pub fn apply_load(&mut self, load: u64) -> bool {
        let next = self.next_interval(load);
        let changed = next != self.current_interval;
        self.current_interval = next;
        changed
    }
}
