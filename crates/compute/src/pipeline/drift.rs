use std::collections::{BTreeMap, BTreeSet};

use shiftwatch_core::{Baseline, CurrentMetrics, ShiftDeltas, SignificantChange};

/// Signed percentage change of `current` relative to `reference`.
///
/// A non-positive reference yields 0: there is nothing to compare against,
/// which is not a drift signal.
pub fn percent_change(current: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    (current - reference) / reference * 100.0
}

/// Mean absolute difference of percentage shares over the union of keys.
///
/// Keys missing on one side count as 0%. Returns 0 if either side is empty.
/// This is an L1-style approximation, symmetric in its arguments; it is not
/// a Jensen-Shannon divergence and carries no information-theoretic bound.
pub fn distribution_change(current: &BTreeMap<String, f64>, reference: &BTreeMap<String, f64>) -> f64 {
    if current.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let keys: BTreeSet<&String> = current.keys().chain(reference.keys()).collect();
    let total: f64 = keys
        .iter()
        .map(|k| {
            let c = current.get(*k).copied().unwrap_or(0.0);
            let r = reference.get(*k).copied().unwrap_or(0.0);
            (c - r).abs()
        })
        .sum();

    total / keys.len() as f64
}

/// Compare a current snapshot against the active baseline.
pub fn compare(current: &CurrentMetrics, baseline: &Baseline) -> ShiftDeltas {
    ShiftDeltas {
        text_length_change_pct: percent_change(current.text_length.mean, baseline.avg_text_length),
        language_distribution_change_score: distribution_change(
            &current.language_distribution,
            &baseline.language_distribution,
        ),
        request_volume_change_pct: percent_change(current.request_volume, baseline.avg_request_volume),
    }
}

/// Whether a delta's magnitude exceeds the threshold.
pub fn classify(delta: f64, threshold: f64) -> bool {
    delta.abs() > threshold
}

/// Deltas whose magnitude exceeds the threshold, in report order.
pub fn significant_changes(deltas: &ShiftDeltas, threshold: f64) -> Vec<SignificantChange> {
    deltas
        .named()
        .into_iter()
        .filter(|(_, value)| classify(*value, threshold))
        .map(|(metric, value)| SignificantChange {
            metric: metric.to_string(),
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shiftwatch_core::TextLengthStats;

    fn dist(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn baseline(avg_len: f64, langs: &[(&str, f64)], volume: f64) -> Baseline {
        Baseline {
            avg_text_length: avg_len,
            text_length_std: 0.0,
            language_distribution: dist(langs),
            avg_request_volume: volume,
            updated_at: Utc::now(),
            description: None,
        }
    }

    fn current(mean: f64, langs: &[(&str, f64)], volume: f64) -> CurrentMetrics {
        CurrentMetrics {
            text_length: TextLengthStats {
                mean,
                count: 1,
                ..TextLengthStats::default()
            },
            language_distribution: dist(langs),
            request_volume: volume,
            ..CurrentMetrics::default()
        }
    }

    #[test]
    fn worked_scenario() {
        let b = baseline(100.0, &[("en", 80.0), ("es", 20.0)], 10.0);
        let c = current(130.0, &[("en", 60.0), ("es", 40.0)], 10.0);
        let d = compare(&c, &b);
        assert!((d.text_length_change_pct - 30.0).abs() < 1e-9);
        assert!((d.language_distribution_change_score - 20.0).abs() < 1e-9);
        assert_eq!(d.request_volume_change_pct, 0.0);
    }

    #[test]
    fn zero_baseline_guards() {
        let b = baseline(0.0, &[("en", 100.0)], 0.0);
        let c = current(50.0, &[("en", 100.0)], 5.0);
        let d = compare(&c, &b);
        assert_eq!(d.text_length_change_pct, 0.0);
        assert_eq!(d.request_volume_change_pct, 0.0);
        assert!(d.text_length_change_pct.is_finite());
    }

    #[test]
    fn negative_change() {
        assert!((percent_change(50.0, 100.0) + 50.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_change_is_symmetric() {
        let a = dist(&[("en", 70.0), ("es", 20.0), ("fr", 10.0)]);
        let b = dist(&[("en", 50.0), ("de", 50.0)]);
        assert_eq!(distribution_change(&a, &b), distribution_change(&b, &a));
        // union {en, es, fr, de}: |20| + |20| + |10| + |50| = 100 / 4
        assert!((distribution_change(&a, &b) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_change_empty_side_is_zero() {
        let a = dist(&[("en", 100.0)]);
        let empty = BTreeMap::new();
        assert_eq!(distribution_change(&a, &empty), 0.0);
        assert_eq!(distribution_change(&empty, &a), 0.0);
    }

    #[test]
    fn identical_distributions_do_not_drift() {
        let a = dist(&[("en", 80.0), ("es", 20.0)]);
        assert_eq!(distribution_change(&a, &a.clone()), 0.0);
    }

    #[test]
    fn classify_uses_magnitude() {
        assert!(classify(25.0, 20.0));
        assert!(classify(-25.0, 20.0));
        assert!(!classify(20.0, 20.0));
        assert!(!classify(-5.0, 20.0));
    }

    #[test]
    fn significant_changes_filters_by_threshold() {
        let d = ShiftDeltas {
            text_length_change_pct: 30.0,
            language_distribution_change_score: 20.0,
            request_volume_change_pct: -45.5,
        };
        let changes = significant_changes(&d, 20.0);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].metric, "text_length_change_pct");
        assert_eq!(changes[1].metric, "request_volume_change_pct");
        assert_eq!(changes[1].value, -45.5);
    }
}
