use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use shiftwatch_core::ShiftStatus;

use super::types::CheckTrigger;

/// Scheduler operational metrics exposed at `/scheduler/metrics`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    /// Checks that ran to completion, whatever their status.
    pub checks_executed: u64,
    /// Checks ending in `error`, plus checks whose task panicked.
    pub checks_failed: u64,
    pub checks_no_data: u64,
    pub manual_triggers: u64,
    pub avg_check_duration: Duration,
    pub last_run: Option<DateTime<Utc>>,
    pub last_status: Option<ShiftStatus>,
    pub last_trigger: Option<CheckTrigger>,
}

impl SchedulerMetrics {
    /// Record a completed check.
    pub fn record_check(&mut self, trigger: CheckTrigger, status: ShiftStatus, duration: Duration) {
        self.checks_executed += 1;
        match status {
            ShiftStatus::Error => self.checks_failed += 1,
            ShiftStatus::NoData => self.checks_no_data += 1,
            ShiftStatus::Success => {}
        }
        self.last_status = Some(status);
        self.note_run(trigger);

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let count = self.checks_executed;
        self.avg_check_duration = if count == 1 {
            duration
        } else {
            let prev_nanos = self.avg_check_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
    }

    /// Record a check whose task aborted without producing a report.
    pub fn record_abort(&mut self, trigger: CheckTrigger) {
        self.checks_failed += 1;
        self.last_status = Some(ShiftStatus::Error);
        self.note_run(trigger);
    }

    fn note_run(&mut self, trigger: CheckTrigger) {
        if trigger == CheckTrigger::Manual {
            self.manual_triggers += 1;
        }
        self.last_run = Some(Utc::now());
        self.last_trigger = Some(trigger);
    }
}
