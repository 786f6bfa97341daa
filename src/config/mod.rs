//! Configuration module for config-export
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence (default format, output directory, record source)

pub mod paths;
pub mod settings;

pub use paths::ExportPaths;
pub use settings::{Settings, SourceKind, SourceSettings};
