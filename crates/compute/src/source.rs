use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use shiftwatch_core::{LogRecord, Result, ShiftError};

/// Window of minutes fetched by [`LogSource::test_connection`].
pub const PROBE_WINDOW_MINUTES: u32 = 5;

/// Time-ranged query over inference log records.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Records with `start <= timestamp <= end`, unordered.
    async fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogRecord>>;

    /// Human-readable identifier used in logs.
    fn name(&self) -> &str;

    /// Records from the last `minutes` minutes, ending now.
    async fn fetch_recent(&self, minutes: u32) -> Result<Vec<LogRecord>> {
        let end = Utc::now();
        let start = end - Duration::minutes(i64::from(minutes));
        self.fetch(start, end).await
    }

    /// Whether a short recent window can be fetched at all.
    async fn test_connection(&self) -> bool {
        match self.fetch_recent(PROBE_WINDOW_MINUTES).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(source = self.name(), error = %e, "log source probe failed");
                false
            }
        }
    }
}

/// Stand-in used when no log source URL is configured. Every fetch fails.
pub struct UnconfiguredSource;

#[async_trait]
impl LogSource for UnconfiguredSource {
    async fn fetch(&self, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<LogRecord>> {
        Err(ShiftError::SourceUnavailable("no log source configured".to_string()))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSource {
        windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl LogSource for RecordingSource {
        async fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogRecord>> {
            self.windows.lock().unwrap().push((start, end));
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn fetch_recent_spans_lookback() {
        let source = RecordingSource { windows: Mutex::new(Vec::new()) };
        source.fetch_recent(60).await.unwrap();
        let windows = source.windows.lock().unwrap();
        let (start, end) = windows[0];
        assert_eq!((end - start).num_minutes(), 60);
    }

    #[tokio::test]
    async fn probe_uses_short_window() {
        let source = RecordingSource { windows: Mutex::new(Vec::new()) };
        assert!(source.test_connection().await);
        let (start, end) = source.windows.lock().unwrap()[0];
        assert_eq!((end - start).num_minutes(), i64::from(PROBE_WINDOW_MINUTES));
    }

    #[tokio::test]
    async fn unconfigured_source_fails() {
        let err = UnconfiguredSource.fetch_recent(10).await.unwrap_err();
        assert!(matches!(err, ShiftError::SourceUnavailable(_)));
        assert!(!UnconfiguredSource.test_connection().await);
    }
}
