//! CSV export
//!
//! Writes one row per setting with the columns `path,scope,scope_id,value`.
//! Hierarchical documents are flattened back into full paths, so both
//! shapes produce the same table. NULL values are written as empty cells.

use ::csv::{ReaderBuilder, WriterBuilder};

use super::FormatEncoder;
use crate::error::{ExportError, ExportResult};
use crate::models::{ConfigRecord, ShapedDocument};
use crate::services::shaper::shape_flat;

/// Column header written as the first row
pub const CSV_HEADER: [&str; 4] = ["path", "scope", "scope_id", "value"];

/// CSV encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEncoder;

impl FormatEncoder for CsvEncoder {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn encode(&self, document: &ShapedDocument) -> ExportResult<Vec<u8>> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for entry in document.entries() {
            writer.write_record([
                entry.path.as_str(),
                entry.scope,
                entry.scope_id,
                entry.value.unwrap_or_default(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Encode(format!("CSV: {}", e)))
    }

    /// Always yields a flat document; an empty cell decodes as NULL
    fn decode(&self, bytes: &[u8]) -> ExportResult<ShapedDocument> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| ExportError::Decode(format!("CSV: {}", e)))?;
        if headers.iter().ne(CSV_HEADER) {
            return Err(ExportError::Decode(format!(
                "CSV: unexpected header {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| ExportError::Decode(format!("CSV: {}", e)))?;
            let value = row.get(3).filter(|v| !v.is_empty()).map(String::from);
            records.push(ConfigRecord::new(&row[0], &row[1], &row[2], value));
        }

        Ok(ShapedDocument::Flat(shape_flat(&records)))
    }
}
