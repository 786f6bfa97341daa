//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod export;

pub use export::{handle_export_command, handle_formats_command, ExportArgs};
