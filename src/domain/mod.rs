// Domain layer - Plain data and pure rules
pub mod dashboard;
pub mod grid;
pub mod layout;
pub mod metric_catalog;
pub mod signal;
pub mod telemetry;
pub mod theme;
pub mod widget;
