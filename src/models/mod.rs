//! Core data models for config-export
//!
//! This module contains the records read from the configuration store and
//! the shaped documents handed to encoders.

pub mod document;
pub mod record;

pub use document::{
    DocumentEntry, FlatDocument, HierarchicalDocument, ScopeIdValues, ScopeValues, ShapedDocument,
};
pub use record::{split_path, ConfigRecord, PATH_DEPTH};
