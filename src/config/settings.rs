//! User settings for config-export
//!
//! Holds the default output format, the output directory, the log level and
//! which record source backend to read from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::ExportPaths;
use crate::error::ExportError;
use crate::export::{FormatRegistry, DEFAULT_FORMAT};
use crate::source::table::DEFAULT_TABLE;

/// Record source backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// SQLite `core_config_data` table (default)
    #[default]
    Table,
    /// JSON or YAML dump of the scoped config tree
    Snapshot,
}

/// Record source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Which backend to read from
    #[serde(default)]
    pub kind: SourceKind,

    /// SQLite database file for the table backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Table holding scoped configuration
    #[serde(default = "default_table")]
    pub table: String,

    /// Dump file for the snapshot backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            database: None,
            table: default_table(),
            snapshot: None,
        }
    }
}

/// User settings for config-export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Format used when `--format` is not given
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Directory for exports without an explicit filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Log level for the `config_export` target
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Record source selection
    #[serde(default)]
    pub source: SourceSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_format: default_format(),
            output_dir: None,
            log_level: default_log_level(),
            source: SourceSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &ExportPaths) -> Result<Self, ExportError> {
        crate::storage::read_json(paths.settings_file()).map_err(|e| {
            ExportError::Config(format!("Failed to load settings file: {}", e))
        })
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExportPaths) -> Result<(), ExportError> {
        paths.ensure_directories()?;
        crate::storage::write_json_atomic(paths.settings_file(), self)
    }

    /// Resolve where exports without a filename override are written
    pub fn output_dir(&self, paths: &ExportPaths) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| paths.default_output_dir())
    }

    /// Check the settings against the registered formats and chosen backend
    pub fn validate(&self, registry: &FormatRegistry) -> Result<(), ExportError> {
        if !registry.contains(&self.default_format) {
            return Err(ExportError::Validation(format!(
                "default_format '{}' is not one of: {}",
                self.default_format,
                registry.names().join(", ")
            )));
        }

        match self.source.kind {
            SourceKind::Table if self.source.database.is_none() => Err(ExportError::Validation(
                "source.database is required for the table source".into(),
            )),
            SourceKind::Snapshot if self.source.snapshot.is_none() => {
                Err(ExportError::Validation(
                    "source.snapshot is required for the snapshot source".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}
