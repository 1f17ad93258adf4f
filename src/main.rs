// Main entry point - Dependency injection and headless runner
use std::sync::Arc;

use anyhow::Context;
use sensecanvas::infrastructure::config::load_settings;
use sensecanvas::infrastructure::export_sink::DirectoryExportSink;
use sensecanvas::infrastructure::file_store::FileKeyValueStore;
use sensecanvas::infrastructure::logging;
use sensecanvas::infrastructure::tokio_scheduler::TokioScheduler;
use sensecanvas::presentation::app_state::AppContext;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // Load configuration
    let settings = load_settings()?;

    // Create adapters (infrastructure layer)
    let storage = Arc::new(
        FileKeyValueStore::new(&settings.storage.dir).context("failed to open state directory")?,
    );
    let state_dir = storage.dir().to_path_buf();
    let exports = Arc::new(DirectoryExportSink::new(&settings.export.dir));
    let scheduler = Arc::new(TokioScheduler::current()?);

    // Create managers (application layer)
    let context = AppContext::new(&settings, storage, scheduler, exports);
    context.init();

    let _theme_log = context.theme.subscribe(|state| {
        tracing::info!(theme = %state.current, "active theme");
    });
    let _metrics_log = context.simulator.subscribe(|state| {
        for metric in state.metrics.iter().filter(|m| !m.history.is_empty()) {
            tracing::debug!(
                metric = %metric.id,
                value = metric.current_value,
                unit = %metric.unit,
                samples = metric.history.len(),
                "metric sample"
            );
        }
    });

    if context.layout.state().widgets.is_empty() {
        tracing::info!("no widgets on the canvas yet");
    }
    if settings.polling.autostart {
        context.layout.start_data_polling();
    }

    tracing::info!(
        state_dir = %state_dir.display(),
        "sensecanvas running, press Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await?;

    context.dispose();
    tracing::info!("shutdown complete");
    Ok(())
}
