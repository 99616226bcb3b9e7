//! AdaptiveScheduler - periodic dashboard broadcast with a load-adaptive period.
//!
//! One driver task owns the `SchedulerState` and runs a single loop over:
//! - the job timer (recompute aggregate, broadcast to the dashboard channel)
//! - the reconfigure timer (read load, maybe replace the job timer)
//! - external commands (`reconfigure_now`)
//! - the shutdown signal
//!
//! Because the job timer lives in the driver, replacing it drops the old
//! one in the same step; there is never more than one armed.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `initial_interval` | 30s | Period after start and under normal load |
//! | `min_interval` / `max_interval` | 10s / 120s | Hard bounds on the period |
//! | `load_threshold` | 100 | Load strictly above this slows the schedule |
//! | `scale_factor` | 1.5 | Growth per high-load reconfiguration |
//! | `reconfigure_every` | 5m | Reconfigure timer period |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, timeout, Instant, Interval, MissedTickBehavior};

use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::live::{LiveError, SchedulerPhase, SchedulerSettings, SchedulerState};
use crate::ports::{DashboardAggregator, LoadSignal};

use super::broadcast_router::BroadcastRouter;

/// Errors from scheduler lifecycle calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulerError {
    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Scheduler is not running")]
    NotRunning,

    #[error("Invalid scheduler settings: {0}")]
    InvalidSettings(#[from] ValidationError),
}

/// Snapshot of the scheduler for the liveness surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub state: SchedulerPhase,
    pub current_interval_ms: u64,
    pub ticks_completed: u64,
    pub ticks_failed: u64,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self {
            state: SchedulerPhase::Stopped,
            current_interval_ms: 0,
            ticks_completed: 0,
            ticks_failed: 0,
        }
    }
}

enum Command {
    ReconfigureNow(oneshot::Sender<Duration>),
}

struct Running {
    commands: mpsc::Sender<Command>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Everything the driver task needs, shared with the handle.
struct Driver {
    aggregator: Arc<dyn DashboardAggregator>,
    router: Arc<BroadcastRouter>,
    load: Arc<dyn LoadSignal>,
    call_timeout: Duration,
    status: watch::Sender<SchedulerStatus>,
    generation: AtomicU64,
}

/// Handle to the adaptive dashboard schedule.
pub struct AdaptiveScheduler {
    driver: Arc<Driver>,
    running: Mutex<Option<Running>>,
}

impl AdaptiveScheduler {
    pub fn new(
        aggregator: Arc<dyn DashboardAggregator>,
        router: Arc<BroadcastRouter>,
        load: Arc<dyn LoadSignal>,
        call_timeout: Duration,
    ) -> Self {
        let (status, _) = watch::channel(SchedulerStatus::default());
        Self {
            driver: Arc::new(Driver {
                aggregator,
                router,
                load,
                call_timeout,
                status,
                generation: AtomicU64::new(0),
            }),
            running: Mutex::new(None),
        }
    }

    /// Arm both timers and begin ticking at `initial_interval`.
    ///
    /// # Errors
    ///
    /// - `InvalidSettings` if the bounds are inconsistent
    /// - `AlreadyRunning` if a driver is active
    pub async fn start(&self, settings: SchedulerSettings) -> Result<(), SchedulerError> {
        settings.validate()?;

        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let state = SchedulerState::new(settings);
        let generation = self.driver.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.driver.status.send_modify(|s| {
            s.state = SchedulerPhase::Running;
            s.current_interval_ms = state.current_interval().as_millis() as u64;
        });

        let (commands, command_rx) = mpsc::channel(8);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let driver = Arc::clone(&self.driver);
        let task = tokio::spawn(async move {
            driver.run(state, generation, command_rx, shutdown_rx).await;
        });

        tracing::info!(
            interval_ms = self.driver.status.borrow().current_interval_ms,
            "Adaptive scheduler started"
        );

        *running = Some(Running {
            commands,
            shutdown,
            task,
        });
        Ok(())
    }

    /// Cancel both timers and wait for the driver to exit.
    ///
    /// A no-op when already stopped.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };

        // Anything the old driver still has in flight is now stale.
        self.driver.generation.fetch_add(1, Ordering::SeqCst);
        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            tracing::warn!(error = %e, "Scheduler driver ended abnormally");
        }

        self.driver.status.send_modify(|s| s.state = SchedulerPhase::Stopped);
        tracing::info!("Adaptive scheduler stopped");
    }

    /// Ask the driver to reconfigure immediately. Returns the resulting interval.
    pub async fn reconfigure_now(&self) -> Result<Duration, SchedulerError> {
        let commands = match self.running.lock().await.as_ref() {
            Some(running) => running.commands.clone(),
            None => return Err(SchedulerError::NotRunning),
        };

        let (reply, reply_rx) = oneshot::channel();
        commands
            .send(Command::ReconfigureNow(reply))
            .await
            .map_err(|_| SchedulerError::NotRunning)?;
        reply_rx.await.map_err(|_| SchedulerError::NotRunning)
    }

    pub fn status(&self) -> SchedulerStatus {
        self.driver.status.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.status().state != SchedulerPhase::Stopped
    }
}

impl Driver {
    async fn run(
        &self,
        mut state: SchedulerState,
        generation: u64,
        mut commands: mpsc::Receiver<Command>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut job = job_timer(state.current_interval());
        let reconfigure_every = state.settings().reconfigure_every;
        let mut reconfigure = time::interval_at(Instant::now() + reconfigure_every, reconfigure_every);
        reconfigure.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => break,

                _ = job.tick() => {
                    if !self.is_current(generation) {
                        break;
                    }
                    self.tick().await;
                }

                _ = reconfigure.tick() => {
                    if !self.is_current(generation) {
                        break;
                    }
                    if self.reconfigure(&mut state).await {
                        job = job_timer(state.current_interval());
                    }
                }

                Some(command) = commands.recv() => match command {
                    Command::ReconfigureNow(reply) => {
                        if self.is_current(generation) && self.reconfigure(&mut state).await {
                            job = job_timer(state.current_interval());
                        }
                        let _ = reply.send(state.current_interval());
                    }
                },
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// One job run. Failures are counted and logged; the schedule continues.
    async fn tick(&self) {
        match self.broadcast_snapshot().await {
            Ok(reached) => {
                self.status.send_modify(|s| s.ticks_completed += 1);
                tracing::debug!(reached, "Dashboard snapshot broadcast");
            }
            Err(e) => {
                self.status.send_modify(|s| s.ticks_failed += 1);
                tracing::warn!(kind = e.kind(), error = %e, "Dashboard tick failed");
            }
        }
    }

    async fn broadcast_snapshot(&self) -> Result<usize, LiveError> {
        let snapshot = match timeout(self.call_timeout, self.aggregator.compute()).await {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                return Err(LiveError::SchedulerTickFailed {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(LiveError::SchedulerTickFailed {
                    reason: format!("aggregate timed out after {}ms", self.call_timeout.as_millis()),
                })
            }
        };

        self.router
            .broadcast_aggregate(snapshot)
            .await
            .map_err(|e| LiveError::SchedulerTickFailed {
                reason: e.to_string(),
            })
    }

    /// Read load and apply it. Returns true when the interval changed.
    async fn reconfigure(&self, state: &mut SchedulerState) -> bool {
        self.set_phase(SchedulerPhase::Reconfiguring);

        let changed = match timeout(self.call_timeout, self.load.current_load()).await {
            Ok(Ok(load)) => {
                let previous = state.current_interval();
                let changed = state.apply_load(load);
                tracing::info!(
                    load,
                    previous_ms = previous.as_millis() as u64,
                    interval_ms = state.current_interval().as_millis() as u64,
                    "Scheduler reconfigured"
                );
                changed
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Load signal failed, keeping interval");
                false
            }
            Err(_) => {
                tracing::warn!("Load signal timed out, keeping interval");
                false
            }
        };

        let interval_ms = state.current_interval().as_millis() as u64;
        self.status.send_modify(|s| s.current_interval_ms = interval_ms);
        self.set_phase(SchedulerPhase::Running);
        changed
    }

    fn set_phase(&self, next: SchedulerPhase) {
        self.status.send_modify(|s| match s.state.transition_to(next) {
            Ok(phase) => s.state = phase,
            Err(e) => tracing::debug!(error = %e, "Ignoring scheduler phase change"),
        });
    }
}

/// Job timer whose first tick is one full period away.
fn job_timer(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
