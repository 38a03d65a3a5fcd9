use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use shiftwatch_compute::{QualityScorer, ScoreSet};
use shiftwatch_core::{Result, ShiftError};

/// Quality scorer backed by an HTTP model-serving endpoint.
///
/// `POST {url}` with `{inputs, outputs}`; the response maps metric names to
/// one score per pair.
pub struct HttpQualityScorer {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    inputs: &'a [&'a str],
    outputs: &'a [&'a str],
}

impl HttpQualityScorer {
    pub fn new(url: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url,
        }
    }
}

fn scoring_failed(e: impl std::fmt::Display) -> ShiftError {
    ShiftError::ScoringFailure(e.to_string())
}

#[async_trait]
impl QualityScorer for HttpQualityScorer {
    async fn score(&self, inputs: &[&str], outputs: &[&str]) -> Result<ScoreSet> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest { inputs, outputs })
            .send()
            .await
            .map_err(scoring_failed)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(scoring_failed(format!("{status}: {body}")));
        }

        response.json::<ScoreSet>().await.map_err(scoring_failed)
    }
}
