use std::sync::Arc;

use shiftwatch_compute::{Scheduler, ShiftMonitor};
use shiftwatch_core::Config;

use crate::exporter::Exporter;

pub struct AppState {
    pub config: Config,
    pub monitor: Arc<ShiftMonitor>,
    pub scheduler: Arc<Scheduler>,
    pub exporter: Exporter,
}
