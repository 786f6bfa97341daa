//! YAML export
//!
//! Writes documents as nested YAML mappings with a short comment header.

use super::FormatEncoder;
use crate::error::{ExportError, ExportResult};
use crate::models::ShapedDocument;

/// YAML encoder (the default format)
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl FormatEncoder for YamlEncoder {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn file_extension(&self) -> &'static str {
        "yaml"
    }

    fn encode(&self, document: &ShapedDocument) -> ExportResult<Vec<u8>> {
        let shape = if document.is_hierarchical() {
            "hierarchical"
        } else {
            "flat"
        };

        let mut out = String::new();
        out.push_str("# Scoped configuration export\n");
        out.push_str(&format!("# Shape: {}\n", shape));
        out.push_str(&format!("# Settings: {}\n", document.record_count()));
        out.push('\n');

        let body = serde_yaml::to_string(document)
            .map_err(|e| ExportError::Encode(format!("YAML: {}", e)))?;
        out.push_str(&body);

        Ok(out.into_bytes())
    }

    /// An empty body carries no shape, so the `# Shape:` header decides it
    fn decode(&self, bytes: &[u8]) -> ExportResult<ShapedDocument> {
        let document: ShapedDocument = serde_yaml::from_slice(bytes)
            .map_err(|e| ExportError::Decode(format!("YAML: {}", e)))?;

        if document.is_empty() {
            return Ok(ShapedDocument::empty(header_is_hierarchical(bytes)));
        }
        Ok(document)
    }
}

fn header_is_hierarchical(bytes: &[u8]) -> bool {
    String::from_utf8_lossy(bytes)
        .lines()
        .take_while(|line| line.starts_with('#'))
        .any(|line| line.trim_start_matches('#').trim() == "Shape: hierarchical")
}
