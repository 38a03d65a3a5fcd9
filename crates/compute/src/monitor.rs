use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use shiftwatch_core::config::MonitorConfig;
use shiftwatch_core::{Baseline, BaselineUpdate, Result, ShiftReport, ShiftStatus};

use crate::pipeline::aggregate::MetricAggregator;
use crate::pipeline::drift;
use crate::source::LogSource;
use crate::store::BaselineStore;

/// Snapshot returned by [`ShiftMonitor::status`].
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub active: bool,
    pub last_result: Option<Arc<ShiftReport>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub total_checks: u64,
}

/// Result of [`ShiftMonitor::health`].
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub overall_healthy: bool,
    pub source_connected: bool,
    pub baseline_loaded: bool,
    pub baseline_path: PathBuf,
    pub log_name: String,
    pub timestamp: DateTime<Utc>,
}

/// The last report together with the number of checks that produced one.
/// Both change under a single write so readers never see them disagree.
#[derive(Default)]
struct LastResult {
    report: Option<Arc<ShiftReport>>,
    total_checks: u64,
}

/// Runs drift checks against the active baseline.
///
/// Checks are serialized by an async mutex: a scheduled check and any number
/// of on-demand triggers each run to completion one after another, and each
/// publishes its report whole.
pub struct ShiftMonitor {
    source: Arc<dyn LogSource>,
    aggregator: MetricAggregator,
    store: Arc<BaselineStore>,
    config: MonitorConfig,
    check_lock: Mutex<()>,
    last: RwLock<LastResult>,
    active: AtomicBool,
}

impl ShiftMonitor {
    pub fn new(
        source: Arc<dyn LogSource>,
        aggregator: MetricAggregator,
        store: Arc<BaselineStore>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            aggregator,
            store,
            config,
            check_lock: Mutex::new(()),
            last: RwLock::new(LastResult::default()),
            active: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one check over the last `lookback_minutes` minutes.
    ///
    /// Never fails: any error becomes a `status=error` report. The report is
    /// published as the last result before it is returned.
    pub async fn check_once(&self, lookback_minutes: u32) -> Arc<ShiftReport> {
        let _guard = self.check_lock.lock().await;

        let report = match self.run_check(lookback_minutes).await {
            Ok(report) => report,
            Err(e) => {
                error!(
                    source = self.source.name(),
                    lookback_minutes,
                    error = %e,
                    "drift check failed"
                );
                ShiftReport::error(lookback_minutes, e.to_string())
            }
        };

        match report.status {
            ShiftStatus::Success => info!(
                status = %report.status,
                total_requests = report.total_requests,
                text_length_change_pct = report.deltas.text_length_change_pct,
                language_distribution_change_score = report.deltas.language_distribution_change_score,
                request_volume_change_pct = report.deltas.request_volume_change_pct,
                "drift check completed"
            ),
            ShiftStatus::NoData => info!(status = %report.status, lookback_minutes, "drift check found no logs"),
            ShiftStatus::Error => info!(status = %report.status, "drift check ended in error"),
        }

        let report = Arc::new(report);
        let mut last = self.last.write().unwrap_or_else(PoisonError::into_inner);
        last.report = Some(Arc::clone(&report));
        last.total_checks += 1;
        report
    }

    async fn run_check(&self, lookback_minutes: u32) -> Result<ShiftReport> {
        let records = self.source.fetch_recent(lookback_minutes).await?;
        if records.is_empty() {
            return Ok(ShiftReport::no_data(lookback_minutes));
        }

        let current = self.aggregator.aggregate(&records).await;
        let baseline = self.store.get();
        let deltas = drift::compare(&current, &baseline);

        let significant = drift::significant_changes(&deltas, self.config.significance_threshold);
        for change in &significant {
            warn!(
                metric = %change.metric,
                value = change.value,
                threshold = self.config.significance_threshold,
                "significant data shift detected"
            );
        }

        Ok(ShiftReport::success(
            lookback_minutes,
            deltas,
            current,
            Baseline::clone(&baseline),
            significant,
        ))
    }

    /// On-demand check using the configured lookback.
    pub async fn trigger_check(&self) -> Arc<ShiftReport> {
        info!("manual drift check triggered");
        self.check_once(self.config.lookback_minutes).await
    }

    pub fn last_result(&self) -> Option<Arc<ShiftReport>> {
        self.last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .report
            .clone()
    }

    pub fn status(&self) -> MonitorStatus {
        let last = self.last.read().unwrap_or_else(PoisonError::into_inner);
        MonitorStatus {
            active: self.is_active(),
            last_timestamp: last.report.as_ref().map(|r| r.timestamp),
            last_result: last.report.clone(),
            total_checks: last.total_checks,
        }
    }

    pub fn baseline(&self) -> Arc<Baseline> {
        self.store.get()
    }

    /// Replace the active baseline. Checks started afterwards use it.
    pub fn update_baseline(&self, update: BaselineUpdate) -> Result<Arc<Baseline>> {
        let baseline = update.into_baseline(Utc::now())?;
        self.store.replace(baseline)
    }

    pub async fn health(&self) -> HealthStatus {
        let source_connected = self.source.test_connection().await;
        let baseline_loaded = self.store.get().validate().is_ok();
        HealthStatus {
            overall_healthy: source_connected && baseline_loaded,
            source_connected,
            baseline_loaded,
            baseline_path: self.store.path().to_path_buf(),
            log_name: self.source.name().to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::NoopScorer;
    use crate::source::UnconfiguredSource;

    fn monitor(dir: &tempfile::TempDir) -> ShiftMonitor {
        let store = BaselineStore::open(dir.path().join("baseline.json")).unwrap();
        ShiftMonitor::new(
            Arc::new(UnconfiguredSource),
            MetricAggregator::new(Arc::new(NoopScorer)),
            Arc::new(store),
            MonitorConfig::default(),
        )
    }

    #[tokio::test]
    async fn source_failure_becomes_error_report() {
        let dir = tempfile::tempdir().unwrap();
        let m = monitor(&dir);
        let report = m.check_once(30).await;

        assert_eq!(report.status, ShiftStatus::Error);
        assert_eq!(report.lookback_minutes, 30);
        assert!(report.message.as_deref().unwrap().contains("no log source configured"));
        assert_eq!(m.status().total_checks, 1);
    }

    #[tokio::test]
    async fn status_starts_empty_and_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let m = monitor(&dir);
        let status = m.status();
        assert!(!status.active);
        assert!(status.last_result.is_none());
        assert!(status.last_timestamp.is_none());

        m.set_active(true);
        assert!(m.status().active);
    }

    #[tokio::test]
    async fn health_reports_disconnected_source() {
        let dir = tempfile::tempdir().unwrap();
        let health = monitor(&dir).health().await;
        assert!(!health.source_connected);
        assert!(health.baseline_loaded);
        assert!(!health.overall_healthy);
        assert_eq!(health.log_name, "unconfigured");
    }

    #[tokio::test]
    async fn health_reflects_in_memory_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let m = monitor(&dir);
        std::fs::remove_file(dir.path().join("baseline.json")).unwrap();

        let health = m.health().await;
        assert!(health.baseline_loaded);
        assert_eq!(m.baseline().avg_text_length, 100.0);
    }
}
