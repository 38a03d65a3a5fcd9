use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use shiftwatch_core::{CurrentMetrics, LogRecord, ModelPerformance, ScoreSummary, TextLengthStats};

use crate::scoring::{QualityScorer, ScoreSet, check_parallel};

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n-1) standard deviation; 0 with fewer than two values.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Median of the values; the two middle values are averaged for even counts.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn summarize(values: &[f64]) -> ScoreSummary {
    ScoreSummary {
        mean: mean(values),
        std: sample_stddev(values),
    }
}

/// Text-length statistics over records that carry input text.
pub fn text_length_stats(records: &[&LogRecord]) -> TextLengthStats {
    let lengths: Vec<f64> = records
        .iter()
        .filter_map(|r| r.text_length())
        .map(|l| l as f64)
        .collect();

    if lengths.is_empty() {
        return TextLengthStats::default();
    }

    TextLengthStats {
        mean: mean(&lengths),
        std: sample_stddev(&lengths),
        min: lengths.iter().copied().fold(f64::INFINITY, f64::min),
        max: lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        median: median(&lengths),
        count: lengths.len(),
    }
}

/// Percentage share of each language among records that carry a language code.
pub fn language_distribution(records: &[&LogRecord]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for lang in records.iter().filter_map(|r| r.language_id()) {
        *counts.entry(lang.to_string()).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }

    counts
        .into_iter()
        .map(|(lang, count)| (lang, count as f64 / total as f64 * 100.0))
        .collect()
}

/// Records per minute over the span between the earliest and latest
/// timestamp, with the span floored at one minute.
pub fn request_volume(records: &[&LogRecord]) -> f64 {
    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.timestamp()).min(),
        records.iter().map(|r| r.timestamp()).max(),
    ) else {
        return 0.0;
    };

    let span_minutes = (last - first).num_milliseconds() as f64 / 60_000.0;
    records.len() as f64 / span_minutes.max(1.0)
}

/// Group parallel score sequences by language and reduce to mean/std.
///
/// `languages[i]` is the language of the i-th scored pair. Non-finite
/// scores are skipped; a language with no finite score is omitted.
pub fn model_performance(languages: &[&str], scores: &ScoreSet) -> ModelPerformance {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();

    for (metric, values) in scores {
        for (lang, value) in languages.iter().zip(values) {
            if !value.is_finite() {
                continue;
            }
            grouped
                .entry(*lang)
                .or_default()
                .entry(metric.as_str())
                .or_default()
                .push(*value);
        }
    }

    grouped
        .into_iter()
        .map(|(lang, metrics)| {
            let summaries = metrics
                .into_iter()
                .map(|(metric, values)| (metric.to_string(), summarize(&values)))
                .collect();
            (lang.to_string(), summaries)
        })
        .collect()
}

/// Everything except model performance, which needs the scorer.
///
/// Pure function of its input. Records with neither text nor language
/// are dropped before any statistic is computed.
pub fn aggregate_records(records: &[LogRecord]) -> CurrentMetrics {
    let valid: Vec<&LogRecord> = records.iter().filter(|r| r.is_valid()).collect();
    if valid.is_empty() {
        return CurrentMetrics::empty(records.len());
    }

    CurrentMetrics {
        text_length: text_length_stats(&valid),
        language_distribution: language_distribution(&valid),
        request_volume: request_volume(&valid),
        model_performance: ModelPerformance::new(),
        total_requests: records.len(),
    }
}

/// Reduces a batch of log records into a [`CurrentMetrics`] snapshot.
#[derive(Clone)]
pub struct MetricAggregator {
    scorer: Arc<dyn QualityScorer>,
}

impl MetricAggregator {
    pub fn new(scorer: Arc<dyn QualityScorer>) -> Self {
        Self { scorer }
    }

    /// Aggregate a batch. Never fails: a scoring failure only leaves
    /// `model_performance` empty for this cycle.
    pub async fn aggregate(&self, records: &[LogRecord]) -> CurrentMetrics {
        let mut metrics = aggregate_records(records);

        let scored: Vec<(&str, &str, &str)> = records
            .iter()
            .filter_map(|r| {
                let lang = r.language_id()?;
                let (input, output) = r.scoring_pair()?;
                Some((lang, input, output))
            })
            .collect();

        if scored.is_empty() {
            debug!(records = records.len(), "no input/output pairs to score");
            return metrics;
        }

        let languages: Vec<&str> = scored.iter().map(|(l, _, _)| *l).collect();
        let inputs: Vec<&str> = scored.iter().map(|(_, i, _)| *i).collect();
        let outputs: Vec<&str> = scored.iter().map(|(_, _, o)| *o).collect();

        let scores = self
            .scorer
            .score(&inputs, &outputs)
            .await
            .and_then(|scores| check_parallel(&scores, inputs.len()).map(|_| scores));

        match scores {
            Ok(scores) => {
                metrics.model_performance = model_performance(&languages, &scores);
            }
            Err(e) => {
                warn!(pairs = inputs.len(), error = %e, "quality scoring failed; model performance omitted");
            }
        }

        metrics
    }
}
