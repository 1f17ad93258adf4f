// Application layer - State managers and the seams they depend on
pub mod key_value_store;
pub mod layout_manager;
pub mod metric_simulator;
pub mod scheduler;
pub mod store;
pub mod theme_manager;
