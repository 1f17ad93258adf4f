use crate::application::layout_manager::Viewport;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageSettings,
    pub export: ExportSettings,
    pub polling: PollingSettings,
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    pub rate_ms: u64,
    pub autostart: bool,
}

impl PollingSettings {
    pub fn rate(&self) -> Duration {
        Duration::from_millis(self.rate_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
}

impl From<&ViewportSettings> for Viewport {
    fn from(settings: &ViewportSettings) -> Self {
        Viewport {
            width: settings.width,
            height: settings.height,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SimulatorSettings {
    pub seed: Option<u64>,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("storage.dir", ".sensecanvas")?
        .set_default("export.dir", "exports")?
        .set_default("polling.rate_ms", 1000)?
        .set_default("polling.autostart", true)?
        .set_default("viewport.width", 1920)?
        .set_default("viewport.height", 1080)
}

/// Defaults, then `config/sensecanvas.toml` if present, then
/// `SENSECANVAS__SECTION__KEY` environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = defaults()?
        .add_source(File::with_name("config/sensecanvas").required(false))
        .add_source(
            Environment::with_prefix("SENSECANVAS")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Defaults overlaid with an inline TOML document.
pub fn settings_from_toml(toml: &str) -> anyhow::Result<Settings> {
    let settings = defaults()?
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}
