use std::collections::BTreeMap;

use async_trait::async_trait;

use shiftwatch_core::{Result, ShiftError};

/// Metric name -> one score per scored pair, parallel to the inputs.
pub type ScoreSet = BTreeMap<String, Vec<f64>>;

/// Computes quality scores for (input, output) text pairs.
///
/// Implementations must return, per metric, exactly one score per pair in
/// input order. Callers verify that with [`check_parallel`].
#[async_trait]
pub trait QualityScorer: Send + Sync {
    async fn score(&self, inputs: &[&str], outputs: &[&str]) -> Result<ScoreSet>;
}

/// Scorer used when no scoring backend is configured. Produces no metrics.
pub struct NoopScorer;

#[async_trait]
impl QualityScorer for NoopScorer {
    async fn score(&self, _inputs: &[&str], _outputs: &[&str]) -> Result<ScoreSet> {
        Ok(ScoreSet::new())
    }
}

/// Reject score sequences whose length differs from the number of pairs.
pub fn check_parallel(scores: &ScoreSet, expected: usize) -> Result<()> {
    for (metric, values) in scores {
        if values.len() != expected {
            return Err(ShiftError::ScoringFailure(format!(
                "metric {} returned {} scores for {} pairs",
                metric,
                values.len(),
                expected
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_scorer_is_empty() {
        let scores = NoopScorer.score(&["a"], &["b"]).await.unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn parallel_lengths_accepted() {
        let scores = ScoreSet::from([
            ("STA".to_string(), vec![0.1, 0.2]),
            ("FL".to_string(), vec![0.3, 0.4]),
        ]);
        assert!(check_parallel(&scores, 2).is_ok());
        assert!(check_parallel(&ScoreSet::new(), 5).is_ok());
    }

    #[test]
    fn short_sequence_rejected() {
        let scores = ScoreSet::from([("SIM".to_string(), vec![0.1])]);
        let err = check_parallel(&scores, 3).unwrap_err();
        assert!(matches!(err, ShiftError::ScoringFailure(_)));
        assert!(err.to_string().contains("SIM"));
    }
}
