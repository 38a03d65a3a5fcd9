use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inference log entry as consumed by the aggregator.
///
/// Empty strings are normalized to `None` on construction, so `text` and
/// `language_id` are either absent or non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLogRecord")]
pub struct LogRecord {
    text: Option<String>,
    language_id: Option<String>,
    detoxified_text: Option<String>,
    timestamp: DateTime<Utc>,
}

/// Wire shape; deserialized records go through [`LogRecord::new`].
#[derive(Deserialize)]
struct RawLogRecord {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language_id: Option<String>,
    #[serde(default)]
    detoxified_text: Option<String>,
    timestamp: DateTime<Utc>,
}

impl From<RawLogRecord> for LogRecord {
    fn from(r: RawLogRecord) -> Self {
        LogRecord::new(r.text, r.language_id, r.detoxified_text, r.timestamp)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl LogRecord {
    pub fn new(
        text: Option<String>,
        language_id: Option<String>,
        detoxified_text: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            text: non_empty(text),
            language_id: non_empty(language_id).map(|l| l.to_lowercase()),
            detoxified_text: non_empty(detoxified_text),
            timestamp,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Lowercased language code.
    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    pub fn detoxified_text(&self) -> Option<&str> {
        self.detoxified_text.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Character length of the input text, if present.
    pub fn text_length(&self) -> Option<usize> {
        self.text.as_ref().map(|t| t.chars().count())
    }

    /// A record lacking both text and language code is dropped before aggregation.
    pub fn is_valid(&self) -> bool {
        self.text.is_some() || self.language_id.is_some()
    }

    /// Input/output pair for quality scoring, when both sides are present.
    pub fn scoring_pair(&self) -> Option<(&str, &str)> {
        match (&self.text, &self.detoxified_text) {
            (Some(input), Some(output)) => Some((input.as_str(), output.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_become_absent() {
        let r = LogRecord::new(Some("".into()), Some("  ".into()), None, Utc::now());
        assert!(r.text().is_none());
        assert!(r.language_id().is_none());
        assert!(!r.is_valid());
    }

    #[test]
    fn text_length_counts_chars() {
        let r = LogRecord::new(Some("héllo".into()), None, None, Utc::now());
        assert_eq!(r.text_length(), Some(5));
        assert!(r.is_valid());
    }

    #[test]
    fn language_only_is_valid() {
        let r = LogRecord::new(None, Some("EN".into()), None, Utc::now());
        assert!(r.is_valid());
        assert_eq!(r.language_id(), Some("en"));
        assert_eq!(r.text_length(), None);
    }

    #[test]
    fn scoring_pair_requires_both_sides() {
        let now = Utc::now();
        let r = LogRecord::new(Some("bad words".into()), Some("en".into()), None, now);
        assert!(r.scoring_pair().is_none());

        let r = LogRecord::new(Some("bad words".into()), Some("en".into()), Some("words".into()), now);
        assert_eq!(r.scoring_pair(), Some(("bad words", "words")));
    }

    #[test]
    fn deserialized_records_are_normalized() {
        let r: LogRecord = serde_json::from_str(
            r#"{"text": "", "language_id": "FR", "detoxified_text": " ", "timestamp": "2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(r.text().is_none());
        assert_eq!(r.text_length(), None);
        assert_eq!(r.language_id(), Some("fr"));
        assert!(r.detoxified_text().is_none());
        assert!(r.is_valid());

        let r: LogRecord =
            serde_json::from_str(r#"{"text": "", "timestamp": "2025-01-01T00:00:00Z"}"#).unwrap();
        assert!(!r.is_valid());
    }
}
