//! Service layer for config-export
//!
//! The shaper turns fetched records into documents; the export service
//! drives a whole invocation on top of a record source and a file sink.

pub mod export;
pub mod shaper;

pub use export::{ExportReport, ExportRequest, ExportService, FileOutcome};
pub use shaper::{bucket, shape, NamespaceBucket};
