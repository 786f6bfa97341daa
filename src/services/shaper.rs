//! Collection shaping
//!
//! Turns the ordered record stream from a record source into the nested
//! documents encoders consume, and partitions records by namespace for
//! per-namespace exports. Records are taken exactly as given: no filtering
//! and no re-sorting happens here.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{ConfigRecord, FlatDocument, HierarchicalDocument, ShapedDocument};

/// Records sharing the same first path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBucket {
    /// First path segment shared by every record in the bucket
    pub namespace: String,

    /// Records in source order
    pub records: Vec<ConfigRecord>,
}

/// Shape records into a flat or hierarchical document
///
/// Later records overwrite earlier ones that share a `(path, scope, scope_id)` key.
pub fn shape(records: &[ConfigRecord], hierarchical: bool) -> ShapedDocument {
    if hierarchical {
        ShapedDocument::Hierarchical(shape_hierarchical(records))
    } else {
        ShapedDocument::Flat(shape_flat(records))
    }
}

/// `path -> scope -> scope_id -> value`
pub fn shape_flat(records: &[ConfigRecord]) -> FlatDocument {
    let mut doc = FlatDocument::new();
    for record in records {
        doc.entry(record.path.clone())
            .or_default()
            .entry(record.scope.clone())
            .or_default()
            .insert(record.scope_id.clone(), record.value.clone());
    }
    doc
}

/// `segment0 -> segment1 -> segment2 -> scope -> scope_id -> value`
pub fn shape_hierarchical(records: &[ConfigRecord]) -> HierarchicalDocument {
    let mut doc = HierarchicalDocument::new();
    for record in records {
        if record.is_too_deep() {
            debug!(path = %record.path, "Dropping config path segments past the third");
        } else if !record.is_well_formed() {
            debug!(path = %record.path, "Padding short config path with empty segments");
        }
        let [first, second, third] = record.path_segments();
        doc.entry(first.to_string())
            .or_default()
            .entry(second.to_string())
            .or_default()
            .entry(third.to_string())
            .or_default()
            .entry(record.scope.clone())
            .or_default()
            .insert(record.scope_id.clone(), record.value.clone());
    }
    doc
}

/// Group records by namespace
///
/// Buckets come back in the order their namespace first appears; each
/// bucket keeps its records in source order.
pub fn bucket(records: &[ConfigRecord]) -> Vec<NamespaceBucket> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<NamespaceBucket> = Vec::new();

    for record in records {
        let namespace = record.namespace();
        let slot = *index.entry(namespace).or_insert_with(|| {
            buckets.push(NamespaceBucket {
                namespace: namespace.to_string(),
                records: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].records.push(record.clone());
    }

    buckets
}
