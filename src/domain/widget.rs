// Widget domain model
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

pub type WidgetConfig = Map<String, Value>;

pub const DEFAULT_DATA_SOURCE: &str = "cpu-temp";
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Visual kind of a widget. Kinds this build does not know are kept verbatim
/// so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetType {
    Gauge,
    LineChart,
    BarChart,
    TextDisplay,
    Other(String),
}

impl WidgetType {
    pub fn as_str(&self) -> &str {
        match self {
            WidgetType::Gauge => "gauge",
            WidgetType::LineChart => "line-chart",
            WidgetType::BarChart => "bar-chart",
            WidgetType::TextDisplay => "text-display",
            WidgetType::Other(name) => name,
        }
    }

    pub fn default_size(&self) -> WidgetSize {
        match self {
            WidgetType::Gauge => WidgetSize::new(320.0, 320.0),
            WidgetType::LineChart => WidgetSize::new(480.0, 320.0),
            WidgetType::BarChart => WidgetSize::new(320.0, 240.0),
            WidgetType::TextDisplay => WidgetSize::new(240.0, 160.0),
            WidgetType::Other(_) => WidgetSize::new(320.0, 240.0),
        }
    }

    pub fn default_config(&self) -> WidgetConfig {
        let value = match self {
            WidgetType::Gauge => json!({
                "min": 0,
                "max": 100,
                "unit": "°C",
                "color": "#6366f1",
                "showValue": true,
                "animation": true
            }),
            WidgetType::LineChart => json!({
                "timeRange": "1h",
                "yAxisMin": 0,
                "yAxisMax": 100,
                "color": "#10b981",
                "showPoints": true,
                "smooth": true
            }),
            WidgetType::BarChart => json!({
                "orientation": "vertical",
                "color": "#f59e0b",
                "showLabels": true,
                "animation": true
            }),
            WidgetType::TextDisplay => json!({
                "fontSize": 24,
                "fontWeight": "bold",
                "color": "#ffffff",
                "alignment": "center",
                "unit": ""
            }),
            WidgetType::Other(_) => return WidgetConfig::new(),
        };
        match value {
            Value::Object(map) => map,
            _ => WidgetConfig::new(),
        }
    }
}

impl From<String> for WidgetType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "gauge" => WidgetType::Gauge,
            "line-chart" => WidgetType::LineChart,
            "bar-chart" => WidgetType::BarChart,
            "text-display" => WidgetType::TextDisplay,
            _ => WidgetType::Other(value),
        }
    }
}

impl From<&str> for WidgetType {
    fn from(value: &str) -> Self {
        WidgetType::from(value.to_string())
    }
}

impl From<WidgetType> for String {
    fn from(value: WidgetType) -> Self {
        match value {
            WidgetType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetSize {
    pub width: f64,
    pub height: f64,
}

impl WidgetSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: String,
    #[serde(default)]
    pub config: WidgetConfig,
    #[serde(default = "default_data_source")]
    pub data_source: String,
}

fn default_data_source() -> String {
    DEFAULT_DATA_SOURCE.to_string()
}

impl Widget {
    /// A widget of `widget_type` with that type's default title and config.
    pub fn new(id: String, widget_type: WidgetType, x: f64, y: f64, size: WidgetSize) -> Self {
        Self {
            id,
            title: format!("{} Widget", widget_type),
            config: widget_type.default_config(),
            widget_type,
            x,
            y,
            width: size.width,
            height: size.height,
            data_source: default_data_source(),
        }
    }

    pub fn size(&self) -> WidgetSize {
        WidgetSize::new(self.width, self.height)
    }

    pub fn apply(&mut self, patch: WidgetPatch) {
        if let Some(widget_type) = patch.widget_type {
            self.widget_type = widget_type;
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(config) = patch.config {
            self.config = config;
        }
        if let Some(data_source) = patch.data_source {
            self.data_source = data_source;
        }
    }
}

/// Partial update for a widget; `None` fields are left untouched. The id is
/// not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetPatch {
    pub widget_type: Option<WidgetType>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub title: Option<String>,
    pub config: Option<WidgetConfig>,
    pub data_source: Option<String>,
}

/// Numeric suffix of a `widget-<n>` id.
pub fn widget_id_suffix(id: &str) -> Option<u64> {
    id.strip_prefix("widget-")?.parse().ok()
}

pub fn widget_id(n: u64) -> String {
    format!("widget-{}", n)
}

/// Portable form of a widget, as offered for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetExport {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    #[serde(default)]
    pub config: WidgetConfig,
    #[serde(default = "default_data_source")]
    pub data_source: String,
    pub size: WidgetSize,
    pub exported_at: String,
    pub version: String,
}

impl WidgetExport {
    pub fn from_widget(widget: &Widget, now: DateTime<Utc>) -> Self {
        Self {
            widget_type: widget.widget_type.clone(),
            title: widget.title.clone(),
            config: widget.config.clone(),
            data_source: widget.data_source.clone(),
            size: widget.size(),
            exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_FORMAT_VERSION.to_string(),
        }
    }

    /// Download file name: the title lowercased with everything but ASCII
    /// letters and digits stripped.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let stem = if stem.is_empty() { "widget".to_string() } else { stem };
        format!("{}_widget.json", stem)
    }
}
