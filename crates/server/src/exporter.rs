//! Prometheus exposition of the last completed drift check.
//!
//! Gauges are refreshed from the monitor's last report at scrape time, so a
//! scrape never waits on an in-flight check.

use std::sync::{Mutex, PoisonError};

use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder};

use shiftwatch_compute::MonitorStatus;
use shiftwatch_core::{ShiftReport, ShiftStatus};

pub struct Exporter {
    registry: Registry,
    text_length_mean_change: Gauge,
    language_distribution_change: Gauge,
    request_volume_change: Gauge,
    last_check_timestamp: Gauge,
    total_requests: Gauge,
    text_length_mean: Gauge,
    request_volume: Gauge,
    language_share: GaugeVec,
    model_performance: GaugeVec,
    checks_total: IntCounter,
    check_status: GaugeVec,
    /// Refresh and gather happen as one step per scrape.
    scrape: Mutex<()>,
}

impl Exporter {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let gauge = |name: &str, help: &str| -> Result<Gauge, prometheus::Error> {
            let g = Gauge::new(name, help)?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };
        let gauge_vec = |name: &str, help: &str, labels: &[&str]| -> Result<GaugeVec, prometheus::Error> {
            let g = GaugeVec::new(Opts::new(name, help), labels)?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };

        let text_length_mean_change =
            gauge("data_shift_text_length_mean_change", "Percent change of mean text length vs baseline")?;
        let language_distribution_change = gauge(
            "data_shift_language_distribution_change",
            "Mean absolute difference of language shares vs baseline, in percentage points",
        )?;
        let request_volume_change =
            gauge("data_shift_request_volume_change", "Percent change of request volume vs baseline")?;
        let last_check_timestamp =
            gauge("data_shift_last_check_timestamp", "Unix time of the last completed check")?;
        let total_requests = gauge("data_shift_total_requests", "Records fetched by the last check")?;
        let text_length_mean = gauge("data_shift_text_length_mean", "Mean input text length in the last check")?;
        let request_volume = gauge("data_shift_request_volume", "Requests per minute in the last check")?;
        let language_share = gauge_vec(
            "data_shift_language_share",
            "Percentage share of each language in the last check",
            &["language"],
        )?;
        let model_performance = gauge_vec(
            "data_shift_model_performance",
            "Quality score summary per language and metric",
            &["language", "metric", "stat"],
        )?;
        let check_status = gauge_vec(
            "data_shift_check_status",
            "1 for the status of the last check, 0 otherwise",
            &["status"],
        )?;

        let checks_total = IntCounter::new("monitoring_checks_total", "Drift checks completed")?;
        registry.register(Box::new(checks_total.clone()))?;

        Ok(Self {
            registry,
            text_length_mean_change,
            language_distribution_change,
            request_volume_change,
            last_check_timestamp,
            total_requests,
            text_length_mean,
            request_volume,
            language_share,
            model_performance,
            checks_total,
            check_status,
            scrape: Mutex::new(()),
        })
    }

    /// Refresh from `status` and encode the registry in text format.
    pub fn render(&self, status: &MonitorStatus) -> Result<String, prometheus::Error> {
        let _guard = self.scrape.lock().unwrap_or_else(PoisonError::into_inner);

        let seen = self.checks_total.get();
        if status.total_checks > seen {
            self.checks_total.inc_by(status.total_checks - seen);
        }
        if let Some(report) = &status.last_result {
            self.apply(report);
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    fn apply(&self, report: &ShiftReport) {
        self.text_length_mean_change.set(report.deltas.text_length_change_pct);
        self.language_distribution_change
            .set(report.deltas.language_distribution_change_score);
        self.request_volume_change.set(report.deltas.request_volume_change_pct);
        self.last_check_timestamp
            .set(report.timestamp.timestamp_millis() as f64 / 1000.0);
        self.total_requests.set(report.total_requests as f64);

        for s in ShiftStatus::ALL {
            let value = if s == report.status { 1.0 } else { 0.0 };
            self.check_status.with_label_values(&[s.as_str()]).set(value);
        }

        // Per-language series only describe the last report.
        self.language_share.reset();
        self.model_performance.reset();

        let Some(current) = &report.current_metrics else {
            self.text_length_mean.set(0.0);
            self.request_volume.set(0.0);
            return;
        };

        self.text_length_mean.set(current.text_length.mean);
        self.request_volume.set(current.request_volume);
        for (lang, share) in &current.language_distribution {
            self.language_share.with_label_values(&[lang.as_str()]).set(*share);
        }
        for (lang, metrics) in &current.model_performance {
            for (metric, summary) in metrics {
                self.model_performance
                    .with_label_values(&[lang.as_str(), metric.as_str(), "mean"])
                    .set(summary.mean);
                self.model_performance
                    .with_label_values(&[lang.as_str(), metric.as_str(), "std"])
                    .set(summary.std);
            }
        }
    }
}
