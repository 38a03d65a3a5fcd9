use thiserror::Error;

/// Failure taxonomy shared by every stage of a check cycle.
///
/// An empty lookback window is not represented here: it is a normal
/// outcome (`ShiftStatus::NoData`), not a failure.
#[derive(Error, Debug)]
pub enum ShiftError {
    /// Log source transport failure. Retried on the next scheduled cycle.
    #[error("Log source unavailable: {0}")]
    SourceUnavailable(String),

    /// Quality scoring failed or returned sequences not parallel to the inputs.
    #[error("Quality scoring failed: {0}")]
    ScoringFailure(String),

    /// Baseline read/write failure.
    #[error("Baseline persistence failed: {0}")]
    Persistence(String),

    /// Malformed control-surface input, rejected before any state mutation.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for ShiftError {
    fn from(e: serde_json::Error) -> Self {
        ShiftError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShiftError>;
