use std::time::Duration;

use serde::{Deserialize, Serialize};

use shiftwatch_core::config::MonitorConfig;

/// What started a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckTrigger {
    /// Periodic tick of the scheduler loop.
    Scheduled,
    /// Out-of-band operator request.
    Manual,
}

impl CheckTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckTrigger::Scheduled => "scheduled",
            CheckTrigger::Manual => "manual",
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduled checks.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Lookback window handed to every check.
    #[serde(default = "default_lookback")]
    pub lookback_minutes: u32,
    /// Run a check immediately when the loop starts instead of after one interval.
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

fn default_check_interval() -> u64 { 300 }
fn default_lookback() -> u32 { 60 }
fn default_run_on_start() -> bool { true }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            lookback_minutes: default_lookback(),
            run_on_start: default_run_on_start(),
        }
    }
}

impl SchedulerConfig {
    /// Tick period. Clamped to at least one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }
}

impl From<&MonitorConfig> for SchedulerConfig {
    fn from(m: &MonitorConfig) -> Self {
        Self {
            check_interval_secs: m.check_interval_secs,
            lookback_minutes: m.lookback_minutes,
            ..Self::default()
        }
    }
}
