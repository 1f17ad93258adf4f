// Logging setup - filter from SENSECANVAS_LOG, defaulting to info
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "SENSECANVAS_LOG";

/// Install the global subscriber, writing to stderr.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
