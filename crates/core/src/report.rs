use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::baseline::Baseline;
use crate::metrics::CurrentMetrics;

/// Terminal outcome of one check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Success,
    NoData,
    Error,
}

impl ShiftStatus {
    pub const ALL: [ShiftStatus; 3] = [ShiftStatus::Success, ShiftStatus::NoData, ShiftStatus::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Success => "success",
            ShiftStatus::NoData => "no_data",
            ShiftStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three independent drift signals, all in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftDeltas {
    pub text_length_change_pct: f64,
    /// Mean absolute difference of language shares (not a JS divergence).
    pub language_distribution_change_score: f64,
    pub request_volume_change_pct: f64,
}

impl ShiftDeltas {
    /// Named view used for significance classification and export.
    pub fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("text_length_change_pct", self.text_length_change_pct),
            ("language_distribution_change_score", self.language_distribution_change_score),
            ("request_volume_change_pct", self.request_volume_change_pct),
        ]
    }
}

/// A delta whose magnitude exceeded the significance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificantChange {
    pub metric: String,
    pub value: f64,
}

/// Result of one check cycle. Produced whole, never patched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub status: ShiftStatus,
    pub timestamp: DateTime<Utc>,
    pub lookback_minutes: u32,
    #[serde(flatten)]
    pub deltas: ShiftDeltas,
    pub total_requests: usize,
    pub current_metrics: Option<CurrentMetrics>,
    pub baseline_metrics: Option<Baseline>,
    #[serde(default)]
    pub significant_changes: Vec<SignificantChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ShiftReport {
    pub fn success(
        lookback_minutes: u32,
        deltas: ShiftDeltas,
        current: CurrentMetrics,
        baseline: Baseline,
        significant_changes: Vec<SignificantChange>,
    ) -> Self {
        Self {
            status: ShiftStatus::Success,
            timestamp: Utc::now(),
            lookback_minutes,
            deltas,
            total_requests: current.total_requests,
            current_metrics: Some(current),
            baseline_metrics: Some(baseline),
            significant_changes,
            message: None,
        }
    }

    pub fn no_data(lookback_minutes: u32) -> Self {
        Self {
            status: ShiftStatus::NoData,
            timestamp: Utc::now(),
            lookback_minutes,
            deltas: ShiftDeltas::default(),
            total_requests: 0,
            current_metrics: None,
            baseline_metrics: None,
            significant_changes: Vec::new(),
            message: Some("No recent logs found for analysis".to_string()),
        }
    }

    pub fn error(lookback_minutes: u32, message: impl Into<String>) -> Self {
        Self {
            status: ShiftStatus::Error,
            timestamp: Utc::now(),
            lookback_minutes,
            deltas: ShiftDeltas::default(),
            total_requests: 0,
            current_metrics: None,
            baseline_metrics: None,
            significant_changes: Vec::new(),
            message: Some(message.into()),
        }
    }
}
