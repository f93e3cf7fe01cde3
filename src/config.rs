//! Configuration file parser for ~/.config/ticklist/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one
//! since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::filter::{CategoriesViewFilter, TodosViewFilter};
use crate::repository::{DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_CAPACITY};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A key parsed but holds a value the application cannot use.
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding both collections. `None` means the default
    /// location next to the config file.
    pub database_path: Option<PathBuf>,

    /// Ask before deleting a todo or category.
    pub confirm_delete: bool,

    /// Initial todo view filter ("all", "active", "completed").
    pub default_filter: String,

    /// Initial category view filter ("all", "active", "inactive").
    pub default_category_filter: String,

    /// Per-repository broadcast buffer. Must be > 0.
    pub broadcast_capacity: usize,

    /// Largest JSON blob a single collection may persist (0 = unlimited).
    pub max_value_bytes: usize,

    /// Column width used when rendering lists.
    pub list_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            confirm_delete: true,
            default_filter: "all".to_string(),
            default_category_filter: "all".to_string(),
            broadcast_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_value_bytes: Self::DEFAULT_MAX_VALUE_BYTES,
            list_width: 80,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Default per-collection blob limit (5 MiB).
    pub const DEFAULT_MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

    const KNOWN_KEYS: [&'static str; 7] = [
        "database_path",
        "confirm_delete",
        "default_filter",
        "default_category_filter",
        "broadcast_capacity",
        "max_value_bytes",
        "list_width",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unusable values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check size before reading so a huge file is never pulled into memory
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            default_filter = %config.default_filter,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "broadcast_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.broadcast_capacity > MAX_CHANNEL_CAPACITY {
            return Err(ConfigError::Invalid {
                key: "broadcast_capacity",
                reason: format!("must be at most {}", MAX_CHANNEL_CAPACITY),
            });
        }
        if let Err(e) = self.default_filter.parse::<TodosViewFilter>() {
            return Err(ConfigError::Invalid {
                key: "default_filter",
                reason: e.to_string(),
            });
        }
        if let Err(e) = self
            .default_category_filter
            .parse::<CategoriesViewFilter>()
        {
            return Err(ConfigError::Invalid {
                key: "default_category_filter",
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the database location, falling back to `<config_dir>/ticklist.db`.
    pub fn database_path_in(&self, config_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| config_dir.join("ticklist.db"))
    }
}

// ============================================================================
// Tests
// ============================================================================
