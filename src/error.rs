//! Custom error types for config-export
//!
//! This module defines the error hierarchy for the export pipeline using
//! thiserror. Setup failures (unknown format, unreachable record source,
//! bad settings) abort an invocation before anything is written; write
//! failures are attributed to a single output file.

use std::path::Path;

use thiserror::Error;

/// The main error type for config-export operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// CSV serialization/deserialization errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// XML serialization/deserialization errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Requested output format has no registered encoder
    #[error("No supported export format found: {0}")]
    UnsupportedFormat(String),

    /// The record source could not produce records
    #[error("Record source error: {0}")]
    RecordSource(String),

    /// An output file could not be written
    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    /// A document could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Bytes could not be decoded back into a document
    #[error("Decode error: {0}")]
    Decode(String),

    /// Validation errors for settings and filters
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ExportError {
    /// Create a write failure for the given output path
    pub fn write_failed(path: &Path, reason: impl ToString) -> Self {
        Self::Write {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error must abort the invocation before any output
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::RecordSource(_) | Self::Config(_)
        )
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<rusqlite::Error> for ExportError {
    fn from(err: rusqlite::Error) -> Self {
        Self::RecordSource(err.to_string())
    }
}

/// Result type alias for config-export operations
pub type ExportResult<T> = Result<T, ExportError>;
