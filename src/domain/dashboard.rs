// Dashboard domain model
use super::grid::GridSettings;
use super::layout::{Layout, WidgetTemplate};
use super::widget::{Widget, widget_id, widget_id_suffix};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelMode {
    #[default]
    Widgets,
    Editor,
    Layouts,
    Alerts,
    Settings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub widgets: Vec<Widget>,
    pub selected_widget_id: Option<String>,
    pub grid_settings: GridSettings,
    pub layouts: Vec<Layout>,
    pub templates: Vec<WidgetTemplate>,
    pub current_layout_id: Option<String>,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub is_left_panel_open: bool,
    pub left_panel_mode: PanelMode,
    /// Numeric suffix the next allocated widget id will carry.
    pub next_widget_id: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            widgets: Vec::new(),
            selected_widget_id: None,
            grid_settings: GridSettings::default(),
            layouts: Vec::new(),
            templates: Vec::new(),
            current_layout_id: None,
            show_grid: true,
            snap_to_grid: true,
            is_left_panel_open: false,
            left_panel_mode: PanelMode::default(),
            next_widget_id: 1,
        }
    }
}

impl DashboardState {
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn selected_widget(&self) -> Option<&Widget> {
        self.selected_widget_id.as_deref().and_then(|id| self.widget(id))
    }

    fn widget_suffixes(&self) -> impl Iterator<Item = u64> + '_ {
        self.widgets
            .iter()
            .chain(self.layouts.iter().flat_map(|l| l.widgets.iter()))
            .filter_map(|w| widget_id_suffix(&w.id))
    }

    /// Smallest counter value that cannot collide with any widget id in use,
    /// including the widgets captured in saved layouts. A suffix of
    /// `u64::MAX` has no successor and is left out of the scan.
    pub fn min_next_widget_id(&self) -> u64 {
        self.widget_suffixes()
            .filter_map(|n| n.checked_add(1))
            .max()
            .unwrap_or(1)
    }

    /// Hand out the next widget id and advance the counter.
    ///
    /// Once the counter is exhausted, the lowest suffix not used on the canvas
    /// or in a saved layout is returned instead.
    pub fn allocate_widget_id(&mut self) -> String {
        let candidate = self.next_widget_id;
        match candidate.checked_add(1) {
            Some(following) if !self.widget_suffixes().any(|n| n == candidate) => {
                self.next_widget_id = following;
                widget_id(candidate)
            }
            _ => {
                let used: HashSet<u64> = self.widget_suffixes().collect();
                let free = (1..u64::MAX).find(|n| !used.contains(n)).unwrap_or(1);
                widget_id(free)
            }
        }
    }

    pub fn to_persisted(&self) -> PersistedDashboard<'_> {
        PersistedDashboard {
            widgets: &self.widgets,
            layouts: &self.layouts,
            templates: &self.templates,
            current_layout_id: self.current_layout_id.as_deref(),
            show_grid: self.show_grid,
            snap_to_grid: self.snap_to_grid,
            grid_settings: &self.grid_settings,
            next_widget_id: self.next_widget_id,
        }
    }

    /// Overlay a persisted payload onto this state one field at a time.
    ///
    /// Fields (and elements of the widget/layout/template lists) that do not
    /// deserialize are skipped; their names are returned so the caller can
    /// report them.
    pub fn restore(&mut self, payload: &Map<String, Value>) -> Vec<String> {
        let mut rejected = Vec::new();

        if let Some(widgets) = restore_list::<Widget>(payload, "widgets", &mut rejected) {
            self.widgets = unique_by_id(widgets, "widgets", |w| w.id.as_str(), &mut rejected);
        }
        if let Some(layouts) = restore_list::<Layout>(payload, "layouts", &mut rejected) {
            self.layouts = unique_by_id(layouts, "layouts", |l| l.id.as_str(), &mut rejected)
                .into_iter()
                .map(|mut l| {
                    l.grid_settings = l.grid_settings.sanitized();
                    l
                })
                .collect();
        }
        if let Some(templates) = restore_list::<WidgetTemplate>(payload, "templates", &mut rejected) {
            self.templates = unique_by_id(templates, "templates", |t| t.id.as_str(), &mut rejected);
        }
        if let Some(current) = restore_field(payload, "currentLayoutId", &mut rejected) {
            self.current_layout_id = current;
        }
        if let Some(show_grid) = restore_field(payload, "showGrid", &mut rejected) {
            self.show_grid = show_grid;
        }
        if let Some(snap) = restore_field(payload, "snapToGrid", &mut rejected) {
            self.snap_to_grid = snap;
        }
        if let Some(grid) = restore_field::<GridSettings>(payload, "gridSettings", &mut rejected) {
            self.grid_settings = grid.sanitized();
        }
        let persisted_counter =
            restore_field::<u64>(payload, "nextWidgetId", &mut rejected).unwrap_or(1);

        self.next_widget_id = persisted_counter.max(self.min_next_widget_id());
        if self.selected_widget().is_none() {
            self.selected_widget_id = None;
        }

        rejected
    }
}

fn restore_field<T: DeserializeOwned>(
    payload: &Map<String, Value>,
    key: &str,
    rejected: &mut Vec<String>,
) -> Option<T> {
    let raw = payload.get(key)?;
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(_) => {
            rejected.push(key.to_string());
            None
        }
    }
}

fn restore_list<T: DeserializeOwned>(
    payload: &Map<String, Value>,
    key: &str,
    rejected: &mut Vec<String>,
) -> Option<Vec<T>> {
    let Some(Value::Array(items)) = payload.get(key) else {
        if payload.contains_key(key) {
            rejected.push(key.to_string());
        }
        return None;
    };

    let mut restored = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value(item.clone()) {
            Ok(value) => restored.push(value),
            Err(_) => rejected.push(format!("{}[{}]", key, index)),
        }
    }
    Some(restored)
}

/// The part of [`DashboardState`] written to durable storage.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDashboard<'a> {
    pub widgets: &'a [Widget],
    pub layouts: &'a [Layout],
    pub templates: &'a [WidgetTemplate],
    pub current_layout_id: Option<&'a str>,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub grid_settings: &'a GridSettings,
    pub next_widget_id: u64,
}
