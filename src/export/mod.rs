//! Export formats for config-export
//!
//! Every output format implements [`FormatEncoder`] and is registered by
//! name in a [`FormatRegistry`]:
//! - `yaml`: human-readable nested mappings (default)
//! - `json`: machine-readable nested mappings
//! - `csv`: one row per setting (spreadsheet-compatible)
//! - `xml`: nested `<key>` elements
//! - `limesodaxml`: environment configuration replaying `config:set` commands
//!
//! Encoders work from the document shape alone; they never need to know
//! which shaping mode produced a document.

pub mod csv;
pub mod json;
pub mod limesoda;
pub mod xml;
pub mod yaml;

pub use self::csv::CsvEncoder;
pub use self::json::JsonEncoder;
pub use self::limesoda::LimeSodaXmlEncoder;
pub use self::xml::XmlEncoder;
pub use self::yaml::YamlEncoder;

use std::collections::BTreeMap;

use crate::error::{ExportError, ExportResult};
use crate::models::ShapedDocument;

/// Format used when none is requested
pub const DEFAULT_FORMAT: &str = "yaml";

/// Serializes shaped documents into one output format
pub trait FormatEncoder {
    /// Registered format name
    fn name(&self) -> &'static str;

    /// Extension appended to output file names, without the dot
    fn file_extension(&self) -> &'static str;

    /// Serialize a document; identical input yields identical bytes
    fn encode(&self, document: &ShapedDocument) -> ExportResult<Vec<u8>>;

    /// Parse bytes produced by [`FormatEncoder::encode`] back into a document
    fn decode(&self, _bytes: &[u8]) -> ExportResult<ShapedDocument> {
        Err(ExportError::Decode(format!(
            "The {} format does not support decoding",
            self.name()
        )))
    }
}

/// Constructor for a registered encoder
pub type EncoderFactory = fn() -> Box<dyn FormatEncoder>;

/// Maps lowercase format names to encoder constructors
pub struct FormatRegistry {
    factories: BTreeMap<String, EncoderFactory>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("yaml", || Box::new(YamlEncoder));
        registry.register("json", || Box::new(JsonEncoder));
        registry.register("csv", || Box::new(CsvEncoder));
        registry.register("xml", || Box::new(XmlEncoder));
        registry.register("limesodaxml", || Box::new(LimeSodaXmlEncoder));
        registry
    }
}

impl FormatRegistry {
    /// Create a registry with the built-in formats
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with no formats
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) a format
    pub fn register(&mut self, name: &str, factory: EncoderFactory) {
        self.factories.insert(name.to_ascii_lowercase(), factory);
    }

    /// Whether a format name resolves, ignoring case
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.trim().to_ascii_lowercase())
    }

    /// Build the encoder for a format name, ignoring case
    pub fn resolve(&self, name: &str) -> ExportResult<Box<dyn FormatEncoder>> {
        let key = name.trim().to_ascii_lowercase();
        self.factories
            .get(&key)
            .map(|factory| factory())
            .ok_or_else(|| ExportError::UnsupportedFormat(name.to_string()))
    }

    /// Registered format names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
