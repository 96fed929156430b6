use std::sync::Arc;
use std::time::Instant;

use crate::channel::LatchedBus;
use crate::config::Settings;
use crate::publisher::RunReport;
use crate::shutdown::ShutdownSignal;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub bus: Arc<LatchedBus>,
    /// Outcome of the publish run being served
    pub report: Arc<RunReport>,
    pub shutdown: ShutdownSignal,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        settings: Settings,
        bus: Arc<LatchedBus>,
        report: RunReport,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            bus,
            report: Arc::new(report),
            shutdown,
            start_time: Instant::now(),
        }
    }
}
