//! Periodic and on-demand driver for drift checks.

pub mod metrics;
pub mod runner;
pub mod types;

pub use metrics::SchedulerMetrics;
pub use runner::Scheduler;
pub use types::{CheckTrigger, SchedulerConfig};
