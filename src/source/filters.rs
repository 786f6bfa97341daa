//! Record filters
//!
//! Include and exclude filters are path prefixes, and scope filters are
//! whole scope names, both compared case-insensitively. This is the same
//! behavior as the SQL the table source generates (`path LIKE 'general%'`,
//! `scope LIKE 'stores'`), so every backend agrees on what a filter selects.

use serde::{Deserialize, Serialize};

use crate::models::ConfigRecord;

/// Path and scope filters applied by a record source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilters {
    /// Path prefixes to include; empty means everything
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Path prefixes to exclude
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Scope names to include; empty means every scope
    #[serde(default)]
    pub include_scopes: Vec<String>,
}

impl RecordFilters {
    /// Build filters from comma-separated option values
    pub fn from_lists(
        include: Option<&str>,
        exclude: Option<&str>,
        include_scope: Option<&str>,
    ) -> Self {
        Self {
            include_paths: split_list(include),
            exclude_paths: split_list(exclude),
            include_scopes: split_list(include_scope),
        }
    }

    /// Whether no filter is set
    pub fn is_empty(&self) -> bool {
        self.include_paths.is_empty()
            && self.exclude_paths.is_empty()
            && self.include_scopes.is_empty()
    }

    /// Whether a record passes every filter
    pub fn matches(&self, record: &ConfigRecord) -> bool {
        let included = self.include_paths.is_empty()
            || self
                .include_paths
                .iter()
                .any(|prefix| starts_with_ignore_case(&record.path, prefix));

        let in_scope = self.include_scopes.is_empty()
            || self
                .include_scopes
                .iter()
                .any(|scope| scope.eq_ignore_ascii_case(&record.scope));

        let excluded = self
            .exclude_paths
            .iter()
            .any(|prefix| starts_with_ignore_case(&record.path, prefix));

        included && in_scope && !excluded
    }
}

/// Split a comma-separated list, dropping blank entries
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
