// SenseCanvas dashboard core - widget layout, simulated metrics and themes
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
