use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use shiftwatch_compute::LogSource;
use shiftwatch_core::{LogRecord, Result, ShiftError};

/// Log source backed by an HTTP query endpoint.
///
/// `GET {url}?log_name=..&start=..&end=..` with RFC 3339 bounds, answering
/// with a JSON array of log entries.
pub struct HttpLogSource {
    client: Client,
    url: String,
    log_name: String,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    input_text: Option<String>,
    language_id: Option<String>,
    detoxified_text: Option<String>,
    timestamp: DateTime<Utc>,
}

impl From<LogEntry> for LogRecord {
    fn from(e: LogEntry) -> Self {
        LogRecord::new(e.input_text, e.language_id, e.detoxified_text, e.timestamp)
    }
}

impl HttpLogSource {
    pub fn new(url: String, log_name: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url,
            log_name,
        }
    }
}

fn unavailable(e: impl std::fmt::Display) -> ShiftError {
    ShiftError::SourceUnavailable(e.to_string())
}

#[async_trait]
impl LogSource for HttpLogSource {
    async fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogRecord>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("log_name", self.log_name.clone()),
                ("start", start.to_rfc3339()),
                ("end", end.to_rfc3339()),
            ])
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("{status}: {body}")));
        }

        let entries: Vec<LogEntry> = response.json().await.map_err(unavailable)?;
        let received = entries.len();
        let records: Vec<LogRecord> = entries
            .into_iter()
            .map(LogRecord::from)
            .filter(|r| r.timestamp() >= start && r.timestamp() <= end)
            .collect();

        debug!(log_name = %self.log_name, received, kept = records.len(), "fetched log entries");
        Ok(records)
    }

    fn name(&self) -> &str {
        &self.log_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::collections::HashMap;

    async fn serve(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/logs", addr)
    }

    #[tokio::test]
    async fn fetch_maps_entries_and_sends_window() {
        let app = axum::Router::new().route(
            "/logs",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q["log_name"], "detox");
                let start: DateTime<Utc> = q["start"].parse().unwrap();
                Json(serde_json::json!([
                    {"input_text": "you fool", "language_id": "EN", "detoxified_text": "you", "timestamp": start},
                    {"language_id": "es", "timestamp": start},
                    {"input_text": "", "timestamp": start},
                    {"input_text": "too old", "timestamp": (start - chrono::Duration::hours(2))}
                ]))
            }),
        );
        let source = HttpLogSource::new(serve(app).await, "detox".into(), 5);

        let records = source.fetch_recent(60).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].language_id(), Some("en"));
        assert_eq!(records[0].text_length(), Some(8));
        assert!(records[1].text().is_none());
        assert!(!records[2].is_valid());
    }

    #[tokio::test]
    async fn server_error_is_source_unavailable() {
        let app = axum::Router::new().route("/logs", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }));
        let source = HttpLogSource::new(serve(app).await, "detox".into(), 5);

        let err = source.fetch_recent(5).await.unwrap_err();
        assert!(matches!(err, ShiftError::SourceUnavailable(ref m) if m.contains("upstream down")));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_probe() {
        let source = HttpLogSource::new("http://127.0.0.1:9/logs".into(), "detox".into(), 1);
        assert!(!source.test_connection().await);
    }
}
