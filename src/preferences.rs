//! Preference manager that merges config.toml defaults with stored overrides.
//!
//! Config values serve as defaults; values in the key-value store under the
//! `pref.` prefix override them. Writes always go to the store, never to the
//! config file.
use std::collections::HashMap;

use crate::config::Config;
use crate::filter::{CategoriesViewFilter, FilterError, TodosViewFilter};
use crate::storage::{KeyValueStore, StoreError};

/// Prefix separating preference rows from collection blobs in the store.
pub const PREF_PREFIX: &str = "pref.";

pub const TODOS_FILTER: &str = "todos.filter";
pub const CATEGORIES_FILTER: &str = "categories.filter";
pub const SELECTED_CATEGORY: &str = "todos.selected_category";
pub const CONFIRM_DELETE: &str = "confirm_delete";

// ============================================================================
// PreferenceManager
// ============================================================================

/// Merged preferences: config.toml defaults + stored overrides.
///
/// On load, config values are flattened into a `HashMap<String, String>`,
/// then all stored preferences are layered on top. Reads are in-memory.
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
    defaults: HashMap<String, String>,
}

impl PreferenceManager {
    /// Load preferences by merging config defaults with stored overrides.
    pub async fn load(config: &Config, store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let defaults = Self::flatten_config(config);
        let mut prefs = defaults.clone();

        let stored = store.entries_with_prefix(PREF_PREFIX).await?;
        tracing::debug!(count = stored.len(), "Loaded stored preferences");
        for (key, value) in stored {
            if let Some(name) = key.strip_prefix(PREF_PREFIX) {
                prefs.insert(name.to_string(), value);
            }
        }

        Ok(Self { prefs, defaults })
    }

    /// Create from config only. Fallback for when the store cannot be read.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::flatten_config(config);
        Self {
            prefs: defaults.clone(),
            defaults,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Set a preference: writes to the store and updates the in-memory map.
    pub async fn set(
        &mut self,
        store: &dyn KeyValueStore,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        store.set(&format!("{PREF_PREFIX}{key}"), value).await?;
        self.prefs.insert(key.to_string(), value.to_string());
        tracing::debug!(key, value, "Preference saved");
        Ok(())
    }

    /// Remove a stored override. The in-memory value falls back to the
    /// config default, if there is one.
    pub async fn clear(&mut self, store: &dyn KeyValueStore, key: &str) -> Result<(), StoreError> {
        store.remove(&format!("{PREF_PREFIX}{key}")).await?;
        match self.defaults.get(key) {
            Some(default) => self.prefs.insert(key.to_string(), default.clone()),
            None => self.prefs.remove(key),
        };
        Ok(())
    }

    // ========================================================================
    // Type-safe Accessors
    // ========================================================================

    pub fn todos_filter(&self) -> Result<TodosViewFilter, FilterError> {
        self.get(TODOS_FILTER)
            .map(str::parse::<TodosViewFilter>)
            .unwrap_or(Ok(TodosViewFilter::default()))
    }

    pub fn categories_filter(&self) -> Result<CategoriesViewFilter, FilterError> {
        self.get(CATEGORIES_FILTER)
            .map(str::parse::<CategoriesViewFilter>)
            .unwrap_or(Ok(CategoriesViewFilter::default()))
    }

    /// Category id the todo view is grouped by, if any.
    pub fn selected_category(&self) -> Option<&str> {
        self.get(SELECTED_CATEGORY).filter(|v| !v.is_empty())
    }

    pub fn confirm_delete(&self) -> bool {
        self.get(CONFIRM_DELETE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn flatten_config(config: &Config) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(TODOS_FILTER.to_string(), config.default_filter.clone());
        map.insert(
            CATEGORIES_FILTER.to_string(),
            config.default_category_filter.clone(),
        );
        map.insert(
            CONFIRM_DELETE.to_string(),
            config.confirm_delete.to_string(),
        );
        map
    }
}

// ============================================================================
// Tests
// ============================================================================
