use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShiftError};

/// Reference snapshot of "normal" traffic that checks are compared against.
///
/// Only replaced by an explicit operator update; never derived from
/// current metrics automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub avg_text_length: f64,
    pub text_length_std: f64,
    /// language -> percentage share.
    pub language_distribution: BTreeMap<String, f64>,
    pub avg_request_volume: f64,
    #[serde(alias = "created_at")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Baseline {
    /// Baseline synthesized when no document exists yet.
    pub fn default_reference() -> Self {
        let language_distribution = [("en", 80.0), ("es", 10.0), ("fr", 5.0), ("de", 3.0), ("it", 2.0)]
            .into_iter()
            .map(|(lang, pct)| (lang.to_string(), pct))
            .collect();
        Self {
            avg_text_length: 100.0,
            text_length_std: 50.0,
            language_distribution,
            avg_request_volume: 10.0,
            updated_at: Utc::now(),
            description: Some("Default baseline - please update with actual data".to_string()),
        }
    }

    /// Reject non-finite or negative statistics and out-of-range shares.
    pub fn validate(&self) -> Result<()> {
        check_non_negative("avg_text_length", self.avg_text_length)?;
        check_non_negative("text_length_std", self.text_length_std)?;
        check_non_negative("avg_request_volume", self.avg_request_volume)?;

        for (lang, pct) in &self.language_distribution {
            if lang.trim().is_empty() {
                return Err(ShiftError::Validation(
                    "language_distribution contains an empty language code".to_string(),
                ));
            }
            if !pct.is_finite() || !(0.0..=100.0).contains(pct) {
                return Err(ShiftError::Validation(format!(
                    "language_distribution[{}] must be within 0..=100, got {}",
                    lang, pct
                )));
            }
        }
        Ok(())
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ShiftError::Validation(format!(
            "{} must be a finite, non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Operator-supplied baseline values. `updated_at` is always server-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineUpdate {
    pub avg_text_length: f64,
    pub text_length_std: f64,
    pub language_distribution: BTreeMap<String, f64>,
    pub avg_request_volume: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl BaselineUpdate {
    /// Stamp the update and validate it. Nothing is mutated on error.
    ///
    /// Language codes are trimmed and lowercased to match record
    /// normalization; codes that collide after that are rejected.
    pub fn into_baseline(self, now: DateTime<Utc>) -> Result<Baseline> {
        let mut language_distribution = BTreeMap::new();
        for (lang, pct) in self.language_distribution {
            let code = lang.trim().to_lowercase();
            if language_distribution.insert(code.clone(), pct).is_some() {
                return Err(ShiftError::Validation(format!(
                    "language_distribution has duplicate code {:?} after normalization",
                    code
                )));
            }
        }

        let baseline = Baseline {
            avg_text_length: self.avg_text_length,
            text_length_std: self.text_length_std,
            language_distribution,
            avg_request_volume: self.avg_request_volume,
            updated_at: now,
            description: self.description,
        };
        baseline.validate()?;
        Ok(baseline)
    }
}

impl From<&Baseline> for BaselineUpdate {
    fn from(b: &Baseline) -> Self {
        Self {
            avg_text_length: b.avg_text_length,
            text_length_std: b.text_length_std,
            language_distribution: b.language_distribution.clone(),
            avg_request_volume: b.avg_request_volume,
            description: b.description.clone(),
        }
    }
}
