//! Path management for config-export
//!
//! Resolves where settings live and where exports land by default.
//!
//! ## Path Resolution Order
//!
//! 1. `CONFIG_EXPORT_HOME` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/config-export` or `~/.config/config-export`
//! 3. Windows: `%APPDATA%\config-export`

use std::path::PathBuf;

use crate::error::ExportError;

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "CONFIG_EXPORT_HOME";

/// Manages all paths used by config-export
#[derive(Debug, Clone)]
pub struct ExportPaths {
    /// Base directory for settings and default output
    base_dir: PathBuf,
}

impl ExportPaths {
    /// Create a new ExportPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, ExportError> {
        let base_dir = match std::env::var(HOME_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create ExportPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Directory exports are written to when settings name none
    pub fn default_output_dir(&self) -> PathBuf {
        self.base_dir.join("var")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ExportError::Io(format!("Failed to create base directory: {}", e)))
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default base directory based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, ExportError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                ExportError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("config-export"))
}

/// Resolve the default base directory based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, ExportError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| ExportError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("config-export"))
}
