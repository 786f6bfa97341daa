//! config-export - Export scoped configuration records to files
//!
//! Reads `(path, scope, scope_id, value)` configuration records from a
//! record source, shapes them into flat or hierarchical documents, and
//! writes them in one of several formats.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and persisted settings
//! - `error`: Custom error types
//! - `models`: Config records and shaped documents
//! - `source`: Record sources (SQLite table, JSON/YAML snapshot)
//! - `services`: Shaping and export orchestration
//! - `export`: Format encoders and the format registry
//! - `storage`: Atomic file output
//! - `cli`: Command handlers for the binary
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use config_export::export::FormatRegistry;
//! use config_export::services::{ExportRequest, ExportService};
//! use config_export::source::TableSource;
//! use config_export::storage::FsSink;
//!
//! let source = TableSource::open("store.sqlite".as_ref(), "core_config_data")?;
//! let registry = FormatRegistry::new();
//! let service = ExportService::new(&source, &FsSink, &registry);
//! let report = service.run(&ExportRequest::default(), chrono::Local::now().naive_local())?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod source;
pub mod storage;

pub use error::{ExportError, ExportResult};
