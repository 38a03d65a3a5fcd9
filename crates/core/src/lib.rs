pub mod baseline;
pub mod config;
pub mod error;
pub mod metrics;
pub mod record;
pub mod report;

pub use baseline::*;
pub use config::Config;
pub use error::*;
pub use metrics::*;
pub use record::*;
pub use report::*;
