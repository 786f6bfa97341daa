//! Shaped export documents
//!
//! Records are reshaped into one of two nested mappings before encoding.
//! Every level is a `BTreeMap`, so all encoders see keys in lexicographic
//! order and repeated exports of the same data produce identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::split_path;

/// `scope_id -> value`
pub type ScopeIdValues = BTreeMap<String, Option<String>>;

/// `scope -> scope_id -> value`
pub type ScopeValues = BTreeMap<String, ScopeIdValues>;

/// `path -> scope -> scope_id -> value`
pub type FlatDocument = BTreeMap<String, ScopeValues>;

/// `segment0 -> segment1 -> segment2 -> scope -> scope_id -> value`
pub type HierarchicalDocument = BTreeMap<String, BTreeMap<String, BTreeMap<String, ScopeValues>>>;

/// A document ready to be handed to an encoder
///
/// Serialized untagged: the nesting depth alone tells the two shapes apart,
/// so decoders can recover the variant without extra markers. An empty
/// document has no depth to inspect, so two empty documents compare equal
/// whatever their variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapedDocument {
    /// Keyed by the full path string
    Flat(FlatDocument),
    /// Keyed by the first three path segments
    Hierarchical(HierarchicalDocument),
}

/// One leaf of a document, flattened back into record form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry<'a> {
    pub path: String,
    pub scope: &'a str,
    pub scope_id: &'a str,
    pub value: Option<&'a str>,
}

impl PartialEq for ShapedDocument {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flat(a), Self::Flat(b)) => a == b,
            (Self::Hierarchical(a), Self::Hierarchical(b)) => a == b,
            _ => self.is_empty() && other.is_empty(),
        }
    }
}

impl Eq for ShapedDocument {}

impl Default for ShapedDocument {
    fn default() -> Self {
        Self::Flat(FlatDocument::new())
    }
}

impl ShapedDocument {
    /// Whether this document was shaped hierarchically
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Hierarchical(_))
    }

    /// An empty document of the given shape
    pub fn empty(hierarchical: bool) -> Self {
        if hierarchical {
            Self::Hierarchical(HierarchicalDocument::new())
        } else {
            Self::Flat(FlatDocument::new())
        }
    }

    /// Whether the document holds no values
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(doc) => doc.is_empty(),
            Self::Hierarchical(doc) => doc.is_empty(),
        }
    }

    /// Number of `(path, scope, scope_id)` leaves
    pub fn record_count(&self) -> usize {
        self.entries().len()
    }

    /// All leaves in key order, with hierarchical paths rebuilt
    ///
    /// Trailing empty segments (from padded short paths) are dropped when the
    /// path is rebuilt.
    pub fn entries(&self) -> Vec<DocumentEntry<'_>> {
        let mut out = Vec::new();
        match self {
            Self::Flat(doc) => {
                for (path, scopes) in doc {
                    push_scope_entries(&mut out, path.clone(), scopes);
                }
            }
            Self::Hierarchical(doc) => {
                for (first, level1) in doc {
                    for (second, level2) in level1 {
                        for (third, scopes) in level2 {
                            let path = join_segments([first, second, third]);
                            push_scope_entries(&mut out, path, scopes);
                        }
                    }
                }
            }
        }
        out
    }

    /// Look up a value by full path, regardless of shape
    ///
    /// Returns `None` when the key is absent and `Some(None)` for a stored NULL.
    pub fn get(&self, path: &str, scope: &str, scope_id: &str) -> Option<Option<&str>> {
        let scopes = match self {
            Self::Flat(doc) => doc.get(path)?,
            Self::Hierarchical(doc) => {
                let [first, second, third] = split_path(path);
                doc.get(first)?.get(second)?.get(third)?
            }
        };
        scopes
            .get(scope)?
            .get(scope_id)
            .map(|value| value.as_deref())
    }
}

fn push_scope_entries<'a>(out: &mut Vec<DocumentEntry<'a>>, path: String, scopes: &'a ScopeValues) {
    for (scope, ids) in scopes {
        for (scope_id, value) in ids {
            out.push(DocumentEntry {
                path: path.clone(),
                scope,
                scope_id,
                value: value.as_deref(),
            });
        }
    }
}

fn join_segments(segments: [&String; 3]) -> String {
    let keep = segments
        .iter()
        .rposition(|s| !s.is_empty())
        .map_or(0, |last| last + 1);
    segments[..keep]
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_sample() -> ShapedDocument {
        let mut ids = ScopeIdValues::new();
        ids.insert("0".into(), Some("Acme".into()));
        ids.insert("1".into(), None);
        let mut scopes = ScopeValues::new();
        scopes.insert("default".into(), ids);
        let mut doc = FlatDocument::new();
        doc.insert("general/store_information/name".into(), scopes);
        ShapedDocument::Flat(doc)
    }

    fn hierarchical_sample() -> ShapedDocument {
        let mut ids = ScopeIdValues::new();
        ids.insert("0".into(), Some("Acme".into()));
        let mut scopes = ScopeValues::new();
        scopes.insert("default".into(), ids);
        let mut doc = HierarchicalDocument::new();
        doc.entry("general".into())
            .or_default()
            .entry("store_information".into())
            .or_default()
            .insert("name".into(), scopes.clone());
        doc.entry("general".into())
            .or_default()
            .entry("".into())
            .or_default()
            .insert("".into(), scopes);
        ShapedDocument::Hierarchical(doc)
    }

    #[test]
    fn test_flat_entries() {
        let doc = flat_sample();
        let entries = doc.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "general/store_information/name");
        assert_eq!(entries[0].scope_id, "0");
        assert_eq!(entries[0].value, Some("Acme"));
        assert_eq!(entries[1].value, None);
    }

    #[test]
    fn test_hierarchical_entries_rebuild_paths() {
        let doc = hierarchical_sample();
        let paths: Vec<_> = doc.entries().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["general", "general/store_information/name"]);
    }

    #[test]
    fn test_get() {
        let doc = flat_sample();
        assert_eq!(
            doc.get("general/store_information/name", "default", "0"),
            Some(Some("Acme"))
        );
        assert_eq!(
            doc.get("general/store_information/name", "default", "1"),
            Some(None)
        );
        assert_eq!(doc.get("general/store_information/name", "stores", "0"), None);

        let doc = hierarchical_sample();
        assert_eq!(
            doc.get("general/store_information/name", "default", "0"),
            Some(Some("Acme"))
        );
        assert_eq!(
            doc.get("general/store_information/name/extra", "default", "0"),
            Some(Some("Acme"))
        );
        assert!(doc.is_hierarchical());
    }

    #[test]
    fn test_untagged_json_detects_shape() {
        let flat = flat_sample();
        let json = serde_json::to_string(&flat).unwrap();
        let back: ShapedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flat);

        let hier = hierarchical_sample();
        let json = serde_json::to_string(&hier).unwrap();
        let back: ShapedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hier);
    }

    #[test]
    fn test_default_is_empty_flat() {
        let doc = ShapedDocument::default();
        assert!(doc.is_empty());
        assert!(!doc.is_hierarchical());
        assert_eq!(doc.record_count(), 0);
    }

    #[test]
    fn test_empty_documents_equal_across_shapes() {
        assert_eq!(ShapedDocument::empty(true), ShapedDocument::empty(false));
        assert!(ShapedDocument::empty(true).is_hierarchical());
        assert_ne!(flat_sample(), ShapedDocument::empty(false));
        assert_ne!(hierarchical_sample(), ShapedDocument::empty(true));
        assert_ne!(flat_sample(), hierarchical_sample());
    }
}
