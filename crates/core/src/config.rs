use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub monitor: MonitorConfig,
    pub log_source: LogSourceConfig,
    pub scorer: ScorerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SHIFTWATCH_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SHIFTWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            monitor: MonitorConfig::from_env_profiled(p),
            log_source: LogSourceConfig::from_env_profiled(p),
            scorer: ScorerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  monitor:     interval={}s, lookback={}m, threshold={}%, baseline={}",
            self.monitor.check_interval_secs,
            self.monitor.lookback_minutes,
            self.monitor.significance_threshold,
            self.monitor.baseline_path.display()
        );
        tracing::info!(
            "  log source:  configured={}, log_name={}",
            self.log_source.is_configured(),
            self.log_source.log_name
        );
        tracing::info!("  scorer:      configured={}", self.scorer.is_configured());
    }

    /// Return a redacted view safe for API responses (no URLs with credentials).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "monitor": {
                "check_interval_secs": self.monitor.check_interval_secs,
                "lookback_minutes": self.monitor.lookback_minutes,
                "significance_threshold": self.monitor.significance_threshold,
                "baseline_path": self.monitor.baseline_path,
            },
            "log_source": {
                "configured": self.log_source.is_configured(),
                "log_name": self.log_source.log_name,
                "timeout_secs": self.log_source.timeout_secs,
            },
            "scorer": {
                "configured": self.scorer.is_configured(),
                "timeout_secs": self.scorer.timeout_secs,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 8081),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Monitor ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub check_interval_secs: u64,
    pub lookback_minutes: u32,
    /// Absolute percentage above which a delta is reported as significant.
    pub significance_threshold: f64,
    pub baseline_path: PathBuf,
}

impl MonitorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            check_interval_secs: profiled_env_parse(p, "CHECK_INTERVAL_SECS", 300),
            lookback_minutes: profiled_env_parse(p, "LOOKBACK_MINUTES", 60),
            significance_threshold: checked_threshold(profiled_env_parse(
                p,
                "SIGNIFICANCE_THRESHOLD",
                DEFAULT_SIGNIFICANCE_THRESHOLD,
            )),
            baseline_path: PathBuf::from(profiled_env_or(p, "BASELINE_PATH", "data/baseline.json")),
        }
    }

}

const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 20.0;

/// A threshold must be a finite, non-negative percentage.
fn checked_threshold(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }
    tracing::warn!(
        "SIGNIFICANCE_THRESHOLD={} is not a non-negative number, using {}",
        value,
        DEFAULT_SIGNIFICANCE_THRESHOLD
    );
    DEFAULT_SIGNIFICANCE_THRESHOLD
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 300,
            lookback_minutes: 60,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            baseline_path: PathBuf::from("data/baseline.json"),
        }
    }
}

// ── Log source ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSourceConfig {
    pub url: Option<String>,
    pub log_name: String,
    pub timeout_secs: u64,
}

impl LogSourceConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "LOG_SOURCE_URL"),
            log_name: profiled_env_or(p, "LOG_NAME", "llm-detox-inference-logs"),
            timeout_secs: profiled_env_parse(p, "LOG_SOURCE_TIMEOUT_SECS", 30),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

// ── Quality scorer ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl ScorerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "SCORER_URL"),
            timeout_secs: profiled_env_parse(p, "SCORER_TIMEOUT_SECS", 60),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_defaults() {
        let m = MonitorConfig::default();
        assert_eq!(m.check_interval_secs, 300);
        assert_eq!(m.lookback_minutes, 60);
        assert_eq!(m.significance_threshold, 20.0);
    }

    #[test]
    fn bad_threshold_falls_back_to_default() {
        assert_eq!(checked_threshold(-5.0), 20.0);
        assert_eq!(checked_threshold(f64::NAN), 20.0);
        assert_eq!(checked_threshold(f64::INFINITY), 20.0);
        assert_eq!(checked_threshold(0.0), 0.0);
        assert_eq!(checked_threshold(12.5), 12.5);
    }

    #[test]
    fn profile_label_defaults() {
        let config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");

        let config = Config::for_profile("staging");
        assert_eq!(config.profile_label(), "STAGING");
    }

    #[test]
    fn redacted_summary_has_sections() {
        let config = Config::for_profile("");
        let summary = config.redacted_summary();
        assert!(summary.get("monitor").is_some());
        assert!(summary["log_source"].get("configured").is_some());
    }
}
