use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use shiftwatch_core::ShiftReport;

use super::metrics::SchedulerMetrics;
use super::types::{CheckTrigger, SchedulerConfig};
use crate::monitor::ShiftMonitor;

/// Drives [`ShiftMonitor::check_once`] on a fixed period and on demand.
///
/// Scheduled and manual checks share the monitor's check lock, so they never
/// overlap. A failed or panicking check is recorded and the loop carries on
/// with the next tick.
pub struct Scheduler {
    config: SchedulerConfig,
    monitor: Arc<ShiftMonitor>,
    metrics: Arc<RwLock<SchedulerMetrics>>,
    shutdown: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, monitor: Arc<ShiftMonitor>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            monitor,
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
            shutdown,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn monitor(&self) -> &Arc<ShiftMonitor> {
        &self.monitor
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Signal the loop to stop after the current tick.
    pub fn shutdown(&self) {
        info!("Scheduler shutdown requested");
        self.shutdown.send_replace(true);
    }

    /// Run a check right now, outside the periodic schedule.
    ///
    /// Returns `None` only if the check task aborted without a report.
    pub async fn trigger_now(&self) -> Option<Arc<ShiftReport>> {
        self.execute(CheckTrigger::Manual).await
    }

    /// Run one check in its own task so a panic cannot take the loop down.
    async fn execute(&self, trigger: CheckTrigger) -> Option<Arc<ShiftReport>> {
        let monitor = Arc::clone(&self.monitor);
        let lookback = self.config.lookback_minutes;
        let started = Instant::now();

        debug!(trigger = trigger.as_str(), lookback_minutes = lookback, "starting check");
        let outcome = tokio::spawn(async move { monitor.check_once(lookback).await }).await;

        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(report) => {
                metrics.record_check(trigger, report.status, started.elapsed());
                Some(report)
            }
            Err(e) => {
                error!(trigger = trigger.as_str(), error = %e, "check task aborted");
                metrics.record_abort(trigger);
                None
            }
        }
    }

    /// Run the scheduling loop until [`Scheduler::shutdown`] is called.
    pub async fn run(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        let period = self.config.interval();
        let first = if self.config.run_on_start {
            tokio::time::Instant::now()
        } else {
            tokio::time::Instant::now() + period
        };

        let mut ticker = interval_at(first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.monitor.set_active(true);
        info!(
            interval_secs = period.as_secs(),
            lookback_minutes = self.config.lookback_minutes,
            run_on_start = self.config.run_on_start,
            "Scheduler started"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    self.execute(CheckTrigger::Scheduled).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.monitor.set_active(false);
        info!("Scheduler stopped");
    }

    /// Spawn [`Scheduler::run`] on the current runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
