// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod export_sink;
pub mod file_store;
pub mod logging;
pub mod manual_scheduler;
pub mod tokio_scheduler;
