//! Storage layer for config-export
//!
//! Output files go through a [`FileSink`]. The filesystem sink writes
//! atomically and creates missing directories.

pub mod file_io;

pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};

use std::path::Path;

use crate::error::ExportResult;

/// Destination for encoded export files
pub trait FileSink {
    /// Write the bytes to the named path, replacing any existing file
    fn write(&self, path: &Path, bytes: &[u8]) -> ExportResult<()>;
}

/// Sink writing to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl FileSink for FsSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> ExportResult<()> {
        write_bytes_atomic(path, bytes)
    }
}
