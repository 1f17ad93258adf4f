// Theme manager - Active theme selection
use crate::application::key_value_store::{KeyValueStore, THEME_KEY};
use crate::application::store::{Store, Subscription};
use crate::domain::theme::{THEME_CATALOG, Theme, ThemeInfo};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeState {
    pub current: Theme,
}

pub struct ThemeManager {
    store: Store<ThemeState>,
    storage: Arc<dyn KeyValueStore>,
}

impl ThemeManager {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: Store::default(),
            storage,
        }
    }

    pub fn init(&self) {
        let saved = match self.storage.get(THEME_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read saved theme");
                None
            }
        };
        let Some(saved) = saved else {
            return;
        };
        match saved.trim().parse::<Theme>() {
            Ok(theme) => self.store.update(|_| ThemeState { current: theme }),
            Err(e) => tracing::warn!(error = %e, "ignoring saved theme"),
        }
    }

    /// Make `theme` current and persist it. Subscribers apply the visuals.
    pub fn set_theme(&self, theme: Theme) {
        self.store.update(|_| ThemeState { current: theme });
        if let Err(e) = self.storage.set(THEME_KEY, theme.id()) {
            tracing::warn!(error = %e, "failed to persist theme");
        }
        tracing::info!(theme = %theme, "theme applied");
    }

    pub fn current(&self) -> Theme {
        self.store.state().current
    }

    pub fn themes(&self) -> &'static [ThemeInfo] {
        &THEME_CATALOG
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ThemeState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }
}
