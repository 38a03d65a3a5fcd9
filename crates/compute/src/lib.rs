pub mod monitor;
pub mod pipeline;
pub mod scheduler;
pub mod scoring;
pub mod source;
pub mod store;

pub use monitor::{HealthStatus, MonitorStatus, ShiftMonitor};
pub use pipeline::MetricAggregator;
pub use scheduler::{CheckTrigger, Scheduler, SchedulerConfig, SchedulerMetrics};
pub use scoring::{NoopScorer, QualityScorer, ScoreSet};
pub use source::{LogSource, UnconfiguredSource};
pub use store::BaselineStore;
