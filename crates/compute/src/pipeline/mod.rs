//! Pure batch computations: records to metrics, metrics to drift.

pub mod aggregate;
pub mod drift;

pub use aggregate::{MetricAggregator, aggregate_records};
pub use drift::{classify, compare, distribution_change, percent_change, significant_changes};
