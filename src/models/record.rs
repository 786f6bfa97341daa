//! Configuration record model
//!
//! A single scoped setting as read from the configuration store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading path segments used as keys in hierarchical documents
pub const PATH_DEPTH: usize = 3;

/// A scoped configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Slash-separated setting path, e.g. `general/store_information/name`
    pub path: String,

    /// Scope the value applies to (`default`, `websites`, `stores`)
    pub scope: String,

    /// Identifier of the website or store within the scope
    pub scope_id: String,

    /// Stored value; `None` when the store holds NULL
    pub value: Option<String>,
}

impl ConfigRecord {
    /// Create a new record
    pub fn new(
        path: impl Into<String>,
        scope: impl Into<String>,
        scope_id: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            scope: scope.into(),
            scope_id: scope_id.into(),
            value,
        }
    }

    /// First path segment, used to bucket records into per-namespace files
    pub fn namespace(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }

    /// The three leading path segments
    ///
    /// Missing segments are returned as empty strings; segments past the
    /// third are dropped.
    pub fn path_segments(&self) -> [&str; PATH_DEPTH] {
        split_path(&self.path)
    }

    /// Whether the path has exactly the three segments hierarchical shaping keys on
    pub fn is_well_formed(&self) -> bool {
        self.path.split('/').count() == PATH_DEPTH
    }

    /// Whether the path has segments past the third
    pub fn is_too_deep(&self) -> bool {
        self.path.split('/').count() > PATH_DEPTH
    }
}

/// Split a path into its first three segments, padding with empty strings
pub fn split_path(path: &str) -> [&str; PATH_DEPTH] {
    let mut parts = path.split('/');
    let first = parts.next().unwrap_or_default();
    let second = parts.next().unwrap_or_default();
    let third = parts.next().unwrap_or_default();
    [first, second, third]
}

impl fmt::Display for ConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}:{}] = {}",
            self.path,
            self.scope,
            self.scope_id,
            self.value.as_deref().unwrap_or("NULL")
        )
    }
}
