use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Text-length statistics over the records that carry input text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLengthStats {
    pub mean: f64,
    /// Sample (n-1) standard deviation; 0 with fewer than two samples.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub count: usize,
}

/// Mean and sample standard deviation of one quality sub-score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub std: f64,
}

/// language -> metric name -> summary.
pub type ModelPerformance = BTreeMap<String, BTreeMap<String, ScoreSummary>>;

/// Snapshot of traffic statistics for one lookback window.
///
/// Built fresh by every check and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub text_length: TextLengthStats,
    /// language -> percentage of records carrying a language code.
    pub language_distribution: BTreeMap<String, f64>,
    /// Records per minute over the observed span (floored at one minute).
    pub request_volume: f64,
    pub model_performance: ModelPerformance,
    /// Raw records received, before validity filtering.
    pub total_requests: usize,
}

impl CurrentMetrics {
    /// All-zero metrics for a batch with no usable records.
    pub fn empty(total_requests: usize) -> Self {
        Self {
            total_requests,
            ..Self::default()
        }
    }
}
