// Saved layouts and widget templates
use super::grid::GridSettings;
use super::widget::{Widget, WidgetConfig, WidgetSize, WidgetType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named snapshot of the canvas. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: String,
    pub name: String,
    pub widgets: Vec<Widget>,
    pub grid_settings: GridSettings,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    #[serde(default)]
    pub config: WidgetConfig,
    pub default_size: WidgetSize,
    pub created_at: DateTime<Utc>,
}

impl WidgetTemplate {
    pub fn from_widget(id: String, name: String, widget: &Widget, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            widget_type: widget.widget_type.clone(),
            config: widget.config.clone(),
            default_size: widget.size(),
            created_at,
        }
    }
}

/// `<prefix>-<unix millis>`, bumped forward until it is not in `taken`.
pub fn timestamp_id<'a, I>(prefix: &str, now: DateTime<Utc>, taken: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut millis = now.timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, millis);
        if !taken.clone().into_iter().any(|t| t == id) {
            return id;
        }
        millis += 1;
    }
}
