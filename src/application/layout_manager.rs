// Layout manager - Widget placement, grid, saved layouts and templates
use crate::application::key_value_store::{DASHBOARD_KEY, ExportSink, KeyValueStore};
use crate::application::metric_simulator::MetricSimulator;
use crate::application::store::{Store, Subscription};
use crate::domain::dashboard::{DashboardState, PanelMode};
use crate::domain::grid::{GridPatch, GridSettings, coerce_cell_size};
use crate::domain::layout::{Layout, WidgetTemplate, timestamp_id};
use crate::domain::widget::{
    EXPORT_FORMAT_VERSION, Widget, WidgetExport, WidgetPatch, WidgetSize, WidgetType,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed widget artifact")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported widget artifact version '{0}'")]
    UnsupportedVersion(String),
}

/// Viewport the grid is sized against at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub struct LayoutManager {
    store: Store<DashboardState>,
    storage: Arc<dyn KeyValueStore>,
    exports: Arc<dyn ExportSink>,
    simulator: Arc<MetricSimulator>,
    viewport: Viewport,
}

impl LayoutManager {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        exports: Arc<dyn ExportSink>,
        simulator: Arc<MetricSimulator>,
        viewport: Viewport,
    ) -> Self {
        Self {
            store: Store::new(DashboardState::default()),
            storage,
            exports,
            simulator,
            viewport,
        }
    }

    pub fn state(&self) -> Arc<DashboardState> {
        self.store.state()
    }

    pub fn selected_widget(&self) -> Option<Widget> {
        self.store.state().selected_widget().cloned()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DashboardState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Size the grid to the viewport and restore whatever persisted state is
    /// readable. Never fails: unreadable data is logged and skipped.
    pub fn init(&self) {
        let grid = GridSettings::for_viewport(self.viewport.width, self.viewport.height);
        let saved = match self.storage.get(DASHBOARD_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read saved dashboard");
                None
            }
        };

        let payload = saved.and_then(|raw| match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                tracing::warn!("saved dashboard is not an object, ignoring it");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load dashboard data");
                None
            }
        });

        self.store.update(|s| {
            let mut next = DashboardState {
                grid_settings: grid,
                ..s.clone()
            };
            if let Some(payload) = &payload {
                let rejected = next.restore(payload);
                if !rejected.is_empty() {
                    tracing::warn!(fields = ?rejected, "discarded malformed dashboard fields");
                }
            } else {
                next.next_widget_id = next.next_widget_id.max(next.min_next_widget_id());
            }
            next
        });

        let state = self.store.state();
        tracing::info!(
            widgets = state.widgets.len(),
            layouts = state.layouts.len(),
            next_widget_id = state.next_widget_id,
            "dashboard initialized"
        );
    }

    fn persist(&self) {
        let state = self.store.state();
        let result = serde_json::to_string(&state.to_persisted())
            .map_err(anyhow::Error::from)
            .and_then(|json| Ok(self.storage.set(DASHBOARD_KEY, &json)?));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist dashboard");
        }
    }

    fn push_widget(&self, build: impl FnOnce(String) -> Widget) -> String {
        let mut allocated = String::new();
        self.store.update(|s| {
            let mut next = s.clone();
            let widget = build(next.allocate_widget_id());
            allocated = widget.id.clone();
            next.widgets.push(widget);
            next
        });
        allocated
    }

    /// Add a widget with the type's default config; `size` defaults per type.
    pub fn add_widget(&self, widget_type: WidgetType, x: f64, y: f64, size: Option<WidgetSize>) -> String {
        let size = size.unwrap_or_else(|| widget_type.default_size());
        let id = self.push_widget(|id| Widget::new(id, widget_type, x, y, size));
        tracing::debug!(widget = %id, "widget added");
        self.persist();
        id
    }

    pub fn update_widget(&self, id: &str, patch: WidgetPatch) {
        self.store.update(|s| {
            let mut next = s.clone();
            match next.widgets.iter_mut().find(|w| w.id == id) {
                Some(widget) => widget.apply(patch),
                None => tracing::debug!(widget = id, "update for unknown widget ignored"),
            }
            next
        });
        self.persist();
    }

    pub fn remove_widget(&self, id: &str) {
        self.store.update(|s| {
            let mut next = s.clone();
            next.widgets.retain(|w| w.id != id);
            if next.selected_widget_id.as_deref() == Some(id) {
                next.selected_widget_id = None;
            }
            next
        });
        self.persist();
    }

    /// Copy a widget 20px down and right under a fresh id.
    pub fn duplicate_widget(&self, id: &str) -> Option<String> {
        let Some(source) = self.store.state().widget(id).cloned() else {
            tracing::debug!(widget = id, "duplicate of unknown widget ignored");
            return None;
        };
        let copy = self.push_widget(|new_id| Widget {
            id: new_id,
            x: source.x + 20.0,
            y: source.y + 20.0,
            title: format!("{} Copy", source.title),
            ..source
        });
        self.persist();
        Some(copy)
    }

    /// Select a widget and open the editor, or clear the selection with `None`.
    pub fn select_widget(&self, id: Option<&str>) {
        self.store.update(|s| match id {
            None => DashboardState {
                selected_widget_id: None,
                ..s.clone()
            },
            Some(id) if s.widget(id).is_some() => DashboardState {
                selected_widget_id: Some(id.to_string()),
                left_panel_mode: PanelMode::Editor,
                ..s.clone()
            },
            Some(id) => {
                tracing::debug!(widget = id, "selection of unknown widget ignored");
                s.clone()
            }
        });
    }

    pub fn set_grid_size(&self, size: u32) {
        let cell_size = coerce_cell_size(size);
        if cell_size != size {
            tracing::debug!(requested = size, "unsupported grid size, using {}", cell_size);
        }
        self.update_grid_settings(GridPatch {
            cell_size: Some(cell_size),
            ..Default::default()
        });
    }

    pub fn update_grid_settings(&self, patch: GridPatch) {
        self.store.update(|s| {
            let mut next = s.clone();
            next.grid_settings.apply(patch);
            next
        });
        self.persist();
    }

    pub fn toggle_grid(&self) {
        self.store.update(|s| DashboardState {
            show_grid: !s.show_grid,
            ..s.clone()
        });
        self.persist();
    }

    pub fn toggle_snap(&self) {
        self.store.update(|s| DashboardState {
            snap_to_grid: !s.snap_to_grid,
            ..s.clone()
        });
        self.persist();
    }

    /// With a mode, open the panel on it; without, flip open/closed.
    pub fn toggle_left_panel(&self, mode: Option<PanelMode>) {
        self.store.update(|s| DashboardState {
            is_left_panel_open: mode.is_some() || !s.is_left_panel_open,
            left_panel_mode: mode.unwrap_or(s.left_panel_mode),
            ..s.clone()
        });
    }

    pub fn close_left_panel(&self) {
        self.store.update(|s| DashboardState {
            is_left_panel_open: false,
            ..s.clone()
        });
    }

    pub fn save_layout(&self, name: &str) -> String {
        let now = Utc::now();
        let mut saved = String::new();
        self.store.update(|s| {
            let mut next = s.clone();
            let layout = Layout {
                id: timestamp_id("layout", now, s.layouts.iter().map(|l| l.id.as_str())),
                name: name.to_string(),
                widgets: s.widgets.clone(),
                grid_settings: s.grid_settings,
                created_at: now,
            };
            saved = layout.id.clone();
            next.current_layout_id = Some(layout.id.clone());
            next.layouts.push(layout);
            next
        });
        tracing::info!(layout = %saved, name, "layout saved");
        self.persist();
        saved
    }

    /// Replace the canvas with a saved layout's widgets and grid.
    pub fn load_layout(&self, id: &str) {
        self.store.update(|s| {
            let Some(layout) = s.layouts.iter().find(|l| l.id == id) else {
                tracing::debug!(layout = id, "load of unknown layout ignored");
                return s.clone();
            };
            let mut next = DashboardState {
                widgets: layout.widgets.clone(),
                grid_settings: layout.grid_settings,
                current_layout_id: Some(id.to_string()),
                ..s.clone()
            };
            if next.selected_widget().is_none() {
                next.selected_widget_id = None;
            }
            next.next_widget_id = next.next_widget_id.max(next.min_next_widget_id());
            tracing::info!(layout = id, widgets = next.widgets.len(), "layout loaded");
            next
        });
        self.persist();
    }

    pub fn delete_layout(&self, id: &str) {
        self.store.update(|s| {
            let mut next = s.clone();
            next.layouts.retain(|l| l.id != id);
            if next.current_layout_id.as_deref() == Some(id) {
                next.current_layout_id = None;
            }
            next
        });
        self.persist();
    }

    pub fn save_widget_as_template(&self, widget_id: &str, name: &str) -> Option<String> {
        let now = Utc::now();
        let mut created = None;
        self.store.update(|s| {
            let Some(widget) = s.widget(widget_id) else {
                tracing::debug!(widget = widget_id, "template from unknown widget ignored");
                return s.clone();
            };
            let mut next = s.clone();
            let id = timestamp_id("template", now, s.templates.iter().map(|t| t.id.as_str()));
            next.templates
                .push(WidgetTemplate::from_widget(id.clone(), name.to_string(), widget, now));
            created = Some(id);
            next
        });
        if created.is_some() {
            self.persist();
        }
        created
    }

    /// Stamp a new widget from a template at `(x, y)`.
    pub fn add_widget_from_template(&self, template_id: &str, x: f64, y: f64) -> Option<String> {
        let Some(template) = self
            .store
            .state()
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .cloned()
        else {
            tracing::debug!(template = template_id, "unknown template ignored");
            return None;
        };
        let id = self.push_widget(|id| {
            let mut widget = Widget::new(id, template.widget_type, x, y, template.default_size);
            widget.title = template.name;
            widget.config = template.config;
            widget
        });
        self.persist();
        Some(id)
    }

    pub fn delete_template(&self, id: &str) {
        self.store.update(|s| {
            let mut next = s.clone();
            next.templates.retain(|t| t.id != id);
            next
        });
        self.persist();
    }

    /// Offer a widget's portable form as a download. Returns the file name
    /// on success.
    pub fn export_widget(&self, widget_id: &str) -> Option<String> {
        let state = self.store.state();
        let Some(widget) = state.widget(widget_id) else {
            tracing::debug!(widget = widget_id, "export of unknown widget ignored");
            return None;
        };
        let export = WidgetExport::from_widget(widget, Utc::now());
        let file_name = export.file_name();
        let offered = serde_json::to_string_pretty(&export)
            .map_err(anyhow::Error::from)
            .and_then(|json| Ok(self.exports.offer(&file_name, &json)?));
        match offered {
            Ok(()) => Some(file_name),
            Err(e) => {
                tracing::warn!(widget = widget_id, error = %e, "widget export failed");
                None
            }
        }
    }

    /// Add a widget from an exported artifact at `(x, y)`.
    pub fn import_widget(&self, artifact: &str, x: f64, y: f64) -> Result<String, ImportError> {
        let export: WidgetExport = serde_json::from_str(artifact)?;
        if export.version != EXPORT_FORMAT_VERSION {
            return Err(ImportError::UnsupportedVersion(export.version));
        }
        let id = self.push_widget(|id| Widget {
            id,
            widget_type: export.widget_type,
            x,
            y,
            width: export.size.width,
            height: export.size.height,
            title: export.title,
            config: export.config,
            data_source: export.data_source,
        });
        self.persist();
        Ok(id)
    }

    pub fn start_data_polling(&self) {
        self.simulator.start_polling();
    }

    pub fn stop_data_polling(&self) {
        self.simulator.stop_polling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::key_value_store::StorageError;
    use crate::domain::widget::{WidgetConfig, widget_id, widget_id_suffix};
    use crate::infrastructure::export_sink::MemoryExportSink;
    use crate::infrastructure::file_store::MemoryKeyValueStore;
    use crate::infrastructure::manual_scheduler::ManualScheduler;
    use serde_json::json;
    use std::collections::HashSet;

    const VIEWPORT: Viewport = Viewport {
        width: 1920,
        height: 1080,
    };

    struct Fixture {
        storage: Arc<MemoryKeyValueStore>,
        exports: Arc<MemoryExportSink>,
        scheduler: Arc<ManualScheduler>,
        manager: LayoutManager,
    }

    fn fixture_with(storage: MemoryKeyValueStore) -> Fixture {
        let storage = Arc::new(storage);
        let exports = Arc::new(MemoryExportSink::new());
        let scheduler = Arc::new(ManualScheduler::new());
        let simulator = MetricSimulator::with_seed(scheduler.clone(), 1);
        let manager = LayoutManager::new(storage.clone(), exports.clone(), simulator, VIEWPORT);
        manager.init();
        Fixture {
            storage,
            exports,
            scheduler,
            manager,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryKeyValueStore::new())
    }

    fn persisted(f: &Fixture) -> Value {
        let raw = f.storage.get(DASHBOARD_KEY).unwrap().expect("dashboard persisted");
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_init_sizes_grid_from_viewport() {
        let f = fixture();
        let grid = f.manager.state().grid_settings;
        assert_eq!((grid.cols, grid.rows, grid.cell_size, grid.gap), (40, 22, 40, 8));
        assert!(f.manager.state().widgets.is_empty());
    }

    #[test]
    fn test_add_then_duplicate_gauge() {
        let f = fixture();
        let id = f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        assert_eq!(id, "widget-1");

        let state = f.manager.state();
        let gauge = state.widget("widget-1").unwrap();
        assert_eq!((gauge.width, gauge.height), (320.0, 320.0));
        assert_eq!(gauge.config["min"], json!(0));
        assert_eq!(gauge.config["max"], json!(100));
        assert_eq!(gauge.config["unit"], json!("°C"));
        assert_eq!(gauge.data_source, "cpu-temp");

        let copy = f.manager.duplicate_widget("widget-1");
        assert_eq!(copy.as_deref(), Some("widget-2"));
        let state = f.manager.state();
        let copy = state.widget("widget-2").unwrap();
        assert_eq!((copy.x, copy.y), (20.0, 20.0));
        assert_eq!(copy.title, "gauge Widget Copy");
        assert_eq!(copy.config, gauge.config);
    }

    #[test]
    fn test_add_widget_with_explicit_size_and_unknown_type() {
        let f = fixture();
        f.manager
            .add_widget(WidgetType::LineChart, 10.0, 30.0, Some(WidgetSize::new(100.0, 50.0)));
        f.manager.add_widget(WidgetType::from("heatmap"), 0.0, 0.0, None);
        let state = f.manager.state();
        let chart = &state.widgets[0];
        assert_eq!((chart.x, chart.y, chart.width, chart.height), (10.0, 30.0, 100.0, 50.0));
        let other = &state.widgets[1];
        assert_eq!((other.width, other.height), (320.0, 240.0));
        assert!(other.config.is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_counter_stays_ahead() {
        let f = fixture();
        let kinds = [
            WidgetType::Gauge,
            WidgetType::LineChart,
            WidgetType::BarChart,
            WidgetType::TextDisplay,
        ];
        for i in 0..12 {
            f.manager.add_widget(kinds[i % 4].clone(), 0.0, 0.0, None);
            if i % 3 == 0 {
                f.manager.remove_widget(&widget_id(1 + i as u64 / 2));
            }
            if i % 5 == 0 {
                f.manager.duplicate_widget(&widget_id(1 + i as u64));
            }
        }
        let state = f.manager.state();
        let ids: HashSet<_> = state.widgets.iter().map(|w| w.id.clone()).collect();
        assert_eq!(ids.len(), state.widgets.len());
        let max = state
            .widgets
            .iter()
            .filter_map(|w| widget_id_suffix(&w.id))
            .max()
            .unwrap();
        assert!(state.next_widget_id > max);
    }

    #[test]
    fn test_missing_targets_are_no_ops() {
        let f = fixture();
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        let before = f.manager.state();

        f.manager.update_widget("widget-9", WidgetPatch {
            title: Some("x".into()),
            ..Default::default()
        });
        f.manager.remove_widget("widget-9");
        assert_eq!(f.manager.duplicate_widget("widget-9"), None);
        f.manager.load_layout("layout-1");
        f.manager.delete_layout("layout-1");
        assert_eq!(f.manager.save_widget_as_template("widget-9", "t"), None);
        assert_eq!(f.manager.add_widget_from_template("template-1", 0.0, 0.0), None);
        assert_eq!(f.manager.export_widget("widget-9"), None);

        assert_eq!(*f.manager.state(), *before);
        assert!(f.exports.offers().is_empty());
    }

    #[test]
    fn test_update_widget_merges_fields() {
        let f = fixture();
        f.manager.add_widget(WidgetType::TextDisplay, 0.0, 0.0, None);
        let mut config = WidgetConfig::new();
        config.insert("fontSize".into(), json!(32));
        f.manager.update_widget("widget-1", WidgetPatch {
            x: Some(80.0),
            data_source: Some("gpu-load".into()),
            config: Some(config),
            ..Default::default()
        });
        let state = f.manager.state();
        let widget = state.widget("widget-1").unwrap();
        assert_eq!(widget.x, 80.0);
        assert_eq!(widget.y, 0.0);
        assert_eq!(widget.data_source, "gpu-load");
        assert_eq!(widget.config["fontSize"], json!(32));
        assert_eq!(persisted(&f)["widgets"][0]["dataSource"], json!("gpu-load"));
    }

    #[test]
    fn test_remove_clears_only_matching_selection() {
        let f = fixture();
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);

        f.manager.select_widget(Some("widget-1"));
        f.manager.remove_widget("widget-2");
        assert_eq!(f.manager.state().selected_widget_id.as_deref(), Some("widget-1"));

        f.manager.remove_widget("widget-1");
        assert_eq!(f.manager.state().selected_widget_id, None);
        assert!(f.manager.selected_widget().is_none());
    }

    #[test]
    fn test_select_switches_panel_to_editor() {
        let f = fixture();
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.toggle_left_panel(Some(PanelMode::Layouts));
        f.manager.select_widget(None);
        assert_eq!(f.manager.state().left_panel_mode, PanelMode::Layouts);

        f.manager.select_widget(Some("widget-1"));
        assert_eq!(f.manager.state().left_panel_mode, PanelMode::Editor);
        assert_eq!(f.manager.selected_widget().map(|w| w.id), Some("widget-1".to_string()));
    }

    #[test]
    fn test_select_unknown_widget_is_ignored() {
        let f = fixture();
        f.manager.select_widget(Some("widget-99"));
        let state = f.manager.state();
        assert_eq!(state.selected_widget_id, None);
        assert_eq!(state.left_panel_mode, PanelMode::Widgets);

        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.select_widget(Some("widget-1"));
        f.manager.toggle_left_panel(Some(PanelMode::Layouts));
        f.manager.select_widget(Some("widget-99"));
        let state = f.manager.state();
        assert_eq!(state.selected_widget_id.as_deref(), Some("widget-1"));
        assert_eq!(state.left_panel_mode, PanelMode::Layouts);
    }

    #[test]
    fn test_left_panel_toggling() {
        let f = fixture();
        f.manager.toggle_left_panel(Some(PanelMode::Settings));
        let state = f.manager.state();
        assert!(state.is_left_panel_open);
        assert_eq!(state.left_panel_mode, PanelMode::Settings);

        f.manager.toggle_left_panel(Some(PanelMode::Alerts));
        assert!(f.manager.state().is_left_panel_open);

        f.manager.toggle_left_panel(None);
        let state = f.manager.state();
        assert!(!state.is_left_panel_open);
        assert_eq!(state.left_panel_mode, PanelMode::Alerts);

        f.manager.toggle_left_panel(None);
        assert!(f.manager.state().is_left_panel_open);
        f.manager.close_left_panel();
        let state = f.manager.state();
        assert!(!state.is_left_panel_open);
        assert_eq!(state.left_panel_mode, PanelMode::Alerts);
    }

    #[test]
    fn test_set_grid_size() {
        let f = fixture();
        for size in [20, 40, 80, 160] {
            f.manager.set_grid_size(size);
            assert_eq!(f.manager.state().grid_settings.cell_size, size);
        }
        for size in [0, 10, 64, 1000] {
            f.manager.set_grid_size(size);
            assert_eq!(f.manager.state().grid_settings.cell_size, 40);
        }
        assert_eq!(persisted(&f)["gridSettings"]["cellSize"], json!(40));
    }

    #[test]
    fn test_toggles_persist() {
        let f = fixture();
        f.manager.toggle_grid();
        f.manager.toggle_snap();
        f.manager.update_grid_settings(GridPatch {
            gap: Some(12),
            ..Default::default()
        });
        let saved = persisted(&f);
        assert_eq!(saved["showGrid"], json!(false));
        assert_eq!(saved["snapToGrid"], json!(false));
        assert_eq!(saved["gridSettings"]["gap"], json!(12));
    }

    #[test]
    fn test_layout_round_trip_restores_exact_state() {
        let f = fixture();
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.add_widget(WidgetType::BarChart, 100.0, 40.0, None);
        f.manager.set_grid_size(80);
        let before = f.manager.state();

        let layout_id = f.manager.save_layout("Main");
        assert_eq!(f.manager.state().current_layout_id.as_deref(), Some(layout_id.as_str()));

        f.manager.remove_widget("widget-1");
        f.manager.update_widget("widget-2", WidgetPatch {
            title: Some("changed".into()),
            ..Default::default()
        });
        f.manager.add_widget(WidgetType::TextDisplay, 0.0, 0.0, None);
        f.manager.set_grid_size(20);

        f.manager.load_layout(&layout_id);
        let after = f.manager.state();
        assert_eq!(after.widgets, before.widgets);
        assert_eq!(after.grid_settings, before.grid_settings);
        assert_eq!(
            serde_json::to_string(&after.widgets).unwrap(),
            serde_json::to_string(&before.widgets).unwrap()
        );

        let next = f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        assert_eq!(next, "widget-4");
    }

    #[test]
    fn test_load_layout_clears_dangling_selection() {
        let f = fixture();
        let layout_id = f.manager.save_layout("empty");
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.select_widget(Some("widget-1"));
        f.manager.load_layout(&layout_id);
        assert_eq!(f.manager.state().selected_widget_id, None);
    }

    #[test]
    fn test_layout_ids_are_unique_and_delete_clears_current() {
        let f = fixture();
        let a = f.manager.save_layout("a");
        let b = f.manager.save_layout("b");
        assert_ne!(a, b);
        assert!(a.starts_with("layout-"));

        f.manager.delete_layout(&a);
        assert_eq!(f.manager.state().current_layout_id.as_deref(), Some(b.as_str()));
        f.manager.delete_layout(&b);
        let state = f.manager.state();
        assert!(state.layouts.is_empty());
        assert_eq!(state.current_layout_id, None);
    }

    #[test]
    fn test_templates_stamp_widgets() {
        let f = fixture();
        f.manager
            .add_widget(WidgetType::LineChart, 0.0, 0.0, Some(WidgetSize::new(600.0, 200.0)));
        let template_id = f.manager.save_widget_as_template("widget-1", "Wide chart").unwrap();
        f.manager.remove_widget("widget-1");

        let stamped = f.manager.add_widget_from_template(&template_id, 40.0, 80.0).unwrap();
        let state = f.manager.state();
        let widget = state.widget(&stamped).unwrap();
        assert_eq!(widget.widget_type, WidgetType::LineChart);
        assert_eq!((widget.width, widget.height), (600.0, 200.0));
        assert_eq!((widget.x, widget.y), (40.0, 80.0));
        assert_eq!(widget.title, "Wide chart");
        assert_eq!(widget.config, WidgetType::LineChart.default_config());
        assert_eq!(persisted(&f)["templates"][0]["name"], json!("Wide chart"));

        f.manager.delete_template(&template_id);
        assert!(f.manager.state().templates.is_empty());
    }

    #[test]
    fn test_export_and_import() {
        let f = fixture();
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.update_widget("widget-1", WidgetPatch {
            title: Some("GPU Temp #1".into()),
            data_source: Some("gpu-temp".into()),
            ..Default::default()
        });

        let file_name = f.manager.export_widget("widget-1").unwrap();
        assert_eq!(file_name, "gputemp1_widget.json");

        let offers = f.exports.offers();
        assert_eq!(offers.len(), 1);
        let artifact: Value = serde_json::from_str(&offers[0].1).unwrap();
        assert_eq!(artifact["type"], json!("gauge"));
        assert_eq!(artifact["title"], json!("GPU Temp #1"));
        assert_eq!(artifact["dataSource"], json!("gpu-temp"));
        assert_eq!(artifact["size"], json!({"width": 320.0, "height": 320.0}));
        assert_eq!(artifact["version"], json!("1.0"));
        assert!(artifact["exportedAt"].as_str().unwrap().ends_with('Z'));
        assert!(artifact.get("id").is_none());

        let imported = f.manager.import_widget(&offers[0].1, 5.0, 6.0).unwrap();
        assert_eq!(imported, "widget-2");
        let state = f.manager.state();
        let copy = state.widget("widget-2").unwrap();
        let original = state.widget("widget-1").unwrap();
        assert_eq!(copy.config, original.config);
        assert_eq!(copy.title, original.title);
        assert_eq!((copy.x, copy.y), (5.0, 6.0));
    }

    #[test]
    fn test_import_rejects_bad_artifacts() {
        let f = fixture();
        assert!(matches!(
            f.manager.import_widget("not json", 0.0, 0.0),
            Err(ImportError::Malformed(_))
        ));
        let future = json!({
            "type": "gauge", "title": "g", "config": {}, "dataSource": "cpu-temp",
            "size": {"width": 1, "height": 1}, "exportedAt": "2024-01-01T00:00:00Z",
            "version": "2.0"
        });
        assert!(matches!(
            f.manager.import_widget(&future.to_string(), 0.0, 0.0),
            Err(ImportError::UnsupportedVersion(v)) if v == "2.0"
        ));
        assert!(f.manager.state().widgets.is_empty());
    }

    #[test]
    fn test_init_restores_counter_from_suffixes() {
        let saved = json!({
            "widgets": [
                {"id": "widget-3", "type": "gauge", "x": 0, "y": 0, "width": 320, "height": 320,
                 "title": "a", "config": {}, "dataSource": "cpu-temp"},
                {"id": "widget-7", "type": "text-display", "x": 0, "y": 0, "width": 240, "height": 160,
                 "title": "b", "config": {}, "dataSource": "cpu-load"}
            ],
            "layouts": [],
            "currentLayoutId": null,
            "showGrid": false,
            "snapToGrid": true,
            "gridSettings": {"cellSize": 80, "gap": 8, "cols": 3, "rows": 4}
        });
        let f = fixture_with(MemoryKeyValueStore::with_entry(DASHBOARD_KEY, &saved.to_string()));
        let state = f.manager.state();
        assert_eq!(state.widgets.len(), 2);
        assert!(!state.show_grid);
        assert_eq!(state.grid_settings.cell_size, 80);

        assert_eq!(f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-8");
    }

    #[test]
    fn test_init_survives_malformed_payload() {
        for raw in ["{not json", "[1,2,3]", "\"text\""] {
            let f = fixture_with(MemoryKeyValueStore::with_entry(DASHBOARD_KEY, raw));
            let state = f.manager.state();
            assert!(state.widgets.is_empty());
            assert_eq!(state.grid_settings.cols, 40);
            assert_eq!(f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-1");
        }
    }

    #[test]
    fn test_init_survives_extreme_widget_ids() {
        let saved = json!({
            "widgets": [
                {"id": "widget-18446744073709551615", "type": "gauge", "x": 0, "y": 0,
                 "width": 320, "height": 320, "title": "a", "config": {}, "dataSource": "cpu-temp"}
            ]
        });
        let f = fixture_with(MemoryKeyValueStore::with_entry(DASHBOARD_KEY, &saved.to_string()));
        assert_eq!(f.manager.state().widgets.len(), 1);
        assert_eq!(f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-1");
        assert_eq!(f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-2");
    }

    #[test]
    fn test_saturated_counter_keeps_ids_unique() {
        let saved = json!({
            "widgets": [
                {"id": "widget-1", "type": "gauge", "x": 0, "y": 0, "width": 320, "height": 320,
                 "title": "a", "config": {}, "dataSource": "cpu-temp"}
            ],
            "nextWidgetId": u64::MAX
        });
        let f = fixture_with(MemoryKeyValueStore::with_entry(DASHBOARD_KEY, &saved.to_string()));
        assert_eq!(f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-2");
        assert_eq!(f.manager.duplicate_widget("widget-1").as_deref(), Some("widget-3"));

        let state = f.manager.state();
        let ids: HashSet<_> = state.widgets.iter().map(|w| w.id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_init_drops_out_of_range_and_duplicate_fields() {
        let widget = json!({"id": "widget-1", "type": "gauge", "x": 0, "y": 0, "width": 320,
                            "height": 320, "title": "a", "config": {}, "dataSource": "cpu-temp"});
        let saved = json!({
            "widgets": [widget.clone(), widget],
            "nextWidgetId": -1,
            "gridSettings": {"cellSize": 4_294_967_296u64}
        });
        let f = fixture_with(MemoryKeyValueStore::with_entry(DASHBOARD_KEY, &saved.to_string()));
        let state = f.manager.state();
        assert_eq!(state.widgets.len(), 1);
        assert_eq!(state.grid_settings.cols, 40);

        f.manager.remove_widget("widget-1");
        assert!(f.manager.state().widgets.is_empty());
        assert_eq!(f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-2");
    }

    #[test]
    fn test_state_survives_restart() {
        let f = fixture();
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.add_widget(WidgetType::BarChart, 0.0, 0.0, None);
        let layout = f.manager.save_layout("keep");
        f.manager.remove_widget("widget-2");

        let raw = f.storage.get(DASHBOARD_KEY).unwrap().unwrap();
        let g = fixture_with(MemoryKeyValueStore::with_entry(DASHBOARD_KEY, &raw));
        let state = g.manager.state();
        assert_eq!(state.widgets.len(), 1);
        assert_eq!(state.current_layout_id.as_deref(), Some(layout.as_str()));
        assert_eq!(g.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-3");
    }

    #[test]
    fn test_polling_delegates_to_simulator() {
        let f = fixture();
        f.manager.start_data_polling();
        assert_eq!(f.scheduler.live_tasks(), 1);
        f.manager.start_data_polling();
        assert_eq!(f.scheduler.live_tasks(), 1);
        f.manager.stop_data_polling();
        assert_eq!(f.scheduler.live_tasks(), 0);
    }

    #[test]
    fn test_subscribers_observe_changes() {
        let f = fixture();
        let counts = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = counts.clone();
        let _sub = f.manager.subscribe(move |s| sink.lock().push(s.widgets.len()));
        f.manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None);
        f.manager.remove_widget("widget-1");
        assert_eq!(*counts.lock(), vec![0, 1, 0]);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_storage_failures_are_not_fatal() {
        let scheduler = Arc::new(ManualScheduler::new());
        let manager = LayoutManager::new(
            Arc::new(FailingStore),
            Arc::new(MemoryExportSink::new()),
            MetricSimulator::with_seed(scheduler, 2),
            VIEWPORT,
        );
        manager.init();
        assert_eq!(manager.add_widget(WidgetType::Gauge, 0.0, 0.0, None), "widget-1");
        assert_eq!(manager.state().widgets.len(), 1);
    }
}
