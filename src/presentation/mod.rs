// Presentation layer - Wiring handed to the rendering side
pub mod app_state;
