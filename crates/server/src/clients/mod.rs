//! HTTP implementations of the log source and quality scorer seams.

mod log_source;
mod scorer;

pub use log_source::HttpLogSource;
pub use scorer::HttpQualityScorer;

use std::sync::Arc;

use tracing::{info, warn};

use shiftwatch_compute::{LogSource, NoopScorer, QualityScorer, UnconfiguredSource};
use shiftwatch_core::Config;

/// Build the log source from config, or a stand-in that fails every fetch.
pub fn log_source_from_config(config: &Config) -> Arc<dyn LogSource> {
    match &config.log_source.url {
        Some(url) => {
            info!(log_name = %config.log_source.log_name, "Log source configured");
            Arc::new(HttpLogSource::new(
                url.clone(),
                config.log_source.log_name.clone(),
                config.log_source.timeout_secs,
            ))
        }
        None => {
            warn!("LOG_SOURCE_URL not set; every check will end in error until it is configured");
            Arc::new(UnconfiguredSource)
        }
    }
}

/// Build the quality scorer from config. Without a URL, model performance stays empty.
pub fn scorer_from_config(config: &Config) -> Arc<dyn QualityScorer> {
    match &config.scorer.url {
        Some(url) => Arc::new(HttpQualityScorer::new(url.clone(), config.scorer.timeout_secs)),
        None => {
            info!("SCORER_URL not set; model performance will not be computed");
            Arc::new(NoopScorer)
        }
    }
}
