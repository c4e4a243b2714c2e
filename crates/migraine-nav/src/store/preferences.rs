use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kv::{KeyValueStore, StoreError, ALERTS_MUTED_KEY, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub alerts_muted: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub alerts_muted: Option<bool>,
}

/// Typed access to the theme and alert-muting keys.
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Preferences, StoreError> {
        let theme = match self.store.get(THEME_KEY)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|source| StoreError::Shape { key: THEME_KEY, source })?,
            None => Theme::default(),
        };
        let alerts_muted = match self.store.get(ALERTS_MUTED_KEY)? {
            Some(Value::Bool(muted)) => muted,
            Some(other) => serde_json::from_value(other).map_err(|source| StoreError::Shape {
                key: ALERTS_MUTED_KEY,
                source,
            })?,
            None => false,
        };
        Ok(Preferences {
            theme,
            alerts_muted,
        })
    }

    pub fn alerts_muted(&self) -> Result<bool, StoreError> {
        self.load().map(|preferences| preferences.alerts_muted)
    }

    pub fn apply(&self, patch: PreferencesPatch) -> Result<Preferences, StoreError> {
        if let Some(theme) = patch.theme {
            let value = serde_json::to_value(theme)
                .map_err(|source| StoreError::Shape { key: THEME_KEY, source })?;
            self.store.put(THEME_KEY, value)?;
        }
        if let Some(muted) = patch.alerts_muted {
            self.store.put(ALERTS_MUTED_KEY, Value::Bool(muted))?;
        }
        self.load()
    }
}
