//! Snapshot record source
//!
//! Reads a dump of the scoped configuration tree from a JSON or YAML file:
//!
//! ```yaml
//! default:
//!   0:
//!     general:
//!       store_information:
//!         name: Acme
//! stores:
//!   1:
//!     web:
//!       secure:
//!         base_url: https://store.example
//! ```
//!
//! The tree is flattened into records. Filters are applied in memory, and the
//! records are sorted into the same order the table source returns.

use std::path::PathBuf;

use serde_yaml::Value;
use tracing::debug;

use super::{sort_records, RecordFilters, RecordSource};
use crate::error::{ExportError, ExportResult};
use crate::models::ConfigRecord;

/// Record source backed by a config dump file
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    /// Create a source reading the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load and flatten the whole snapshot
    fn load(&self) -> ExportResult<Vec<ConfigRecord>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ExportError::RecordSource(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let is_yaml = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let tree: Value = if is_yaml {
            serde_yaml::from_str(&contents).map_err(|e| self.parse_error(e))?
        } else {
            serde_json::from_str(&contents).map_err(|e| self.parse_error(e))?
        };

        flatten_snapshot(&tree).map_err(|e| self.parse_error(e))
    }

    fn parse_error(&self, err: impl ToString) -> ExportError {
        ExportError::RecordSource(format!(
            "Failed to parse {}: {}",
            self.path.display(),
            err.to_string()
        ))
    }
}

impl RecordSource for SnapshotSource {
    fn fetch(&self, filters: &RecordFilters) -> ExportResult<Vec<ConfigRecord>> {
        let all = self.load()?;
        let total = all.len();
        let mut records: Vec<_> = all.into_iter().filter(|r| filters.matches(r)).collect();
        sort_records(&mut records);
        debug!(total, selected = records.len(), "Filtered snapshot records");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}

/// Flatten `scope -> scope_id -> tree` into records
fn flatten_snapshot(tree: &Value) -> Result<Vec<ConfigRecord>, String> {
    let mut records = Vec::new();
    let Value::Mapping(scopes) = untag(tree) else {
        if matches!(untag(tree), Value::Null) {
            return Ok(records);
        }
        return Err("top level must map scopes to scope ids".to_string());
    };

    for (scope, ids) in scopes {
        let scope = key_to_string(scope)?;
        let Value::Mapping(ids) = untag(ids) else {
            return Err(format!("scope '{}' must map scope ids to settings", scope));
        };
        for (scope_id, settings) in ids {
            let scope_id = key_to_string(scope_id)?;
            let mut prefix = Vec::new();
            flatten_tree(settings, &mut prefix, &scope, &scope_id, &mut records)?;
        }
    }

    Ok(records)
}

fn flatten_tree(
    node: &Value,
    prefix: &mut Vec<String>,
    scope: &str,
    scope_id: &str,
    out: &mut Vec<ConfigRecord>,
) -> Result<(), String> {
    match untag(node) {
        Value::Mapping(children) => {
            for (key, child) in children {
                prefix.push(key_to_string(key)?);
                flatten_tree(child, prefix, scope, scope_id, out)?;
                prefix.pop();
            }
            Ok(())
        }
        Value::Sequence(_) => Err(format!(
            "unsupported list value at '{}' ({}:{})",
            prefix.join("/"),
            scope,
            scope_id
        )),
        leaf => {
            if prefix.is_empty() {
                return Err(format!("scope {}:{} holds a bare value", scope, scope_id));
            }
            out.push(ConfigRecord::new(
                prefix.join("/"),
                scope,
                scope_id,
                scalar_to_string(leaf),
            ));
            Ok(())
        }
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn key_to_string(key: &Value) -> Result<String, String> {
    scalar_to_string(key).ok_or_else(|| format!("unsupported key: {:?}", key))
}
