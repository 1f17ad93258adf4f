// Application context shared with whatever renders the dashboard
use crate::application::key_value_store::{ExportSink, KeyValueStore};
use crate::application::layout_manager::LayoutManager;
use crate::application::metric_simulator::MetricSimulator;
use crate::application::scheduler::Scheduler;
use crate::application::theme_manager::ThemeManager;
use crate::infrastructure::config::Settings;
use std::sync::Arc;

/// The three managers, built once per process.
#[derive(Clone)]
pub struct AppContext {
    pub simulator: Arc<MetricSimulator>,
    pub layout: Arc<LayoutManager>,
    pub theme: Arc<ThemeManager>,
}

impl AppContext {
    pub fn new(
        settings: &Settings,
        storage: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn Scheduler>,
        exports: Arc<dyn ExportSink>,
    ) -> Self {
        let simulator = match settings.simulator.seed {
            Some(seed) => MetricSimulator::with_seed(scheduler, seed),
            None => MetricSimulator::new(scheduler),
        };
        simulator.set_polling_rate(settings.polling.rate());

        let layout = LayoutManager::new(
            storage.clone(),
            exports,
            simulator.clone(),
            (&settings.viewport).into(),
        );

        Self {
            simulator,
            layout: Arc::new(layout),
            theme: Arc::new(ThemeManager::new(storage)),
        }
    }

    /// Restore persisted state into every manager.
    pub fn init(&self) {
        self.layout.init();
        self.theme.init();
    }

    pub fn dispose(&self) {
        self.layout.stop_data_polling();
    }
}
