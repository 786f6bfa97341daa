//! SQLite table record source
//!
//! Reads the `core_config_data` table:
//!
//! ```sql
//! CREATE TABLE core_config_data (
//!     config_id INTEGER PRIMARY KEY,
//!     scope     TEXT NOT NULL DEFAULT 'default',
//!     scope_id  INTEGER NOT NULL DEFAULT 0,
//!     path      TEXT NOT NULL,
//!     value     TEXT
//! );
//! ```
//!
//! Filters are pushed down into SQL. Include prefixes are OR-ed, scope
//! names are OR-ed, and every exclude prefix is AND-ed as `NOT LIKE`.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use tracing::debug;

use super::{RecordFilters, RecordSource};
use crate::error::{ExportError, ExportResult};
use crate::models::ConfigRecord;

/// Default table holding scoped configuration
pub const DEFAULT_TABLE: &str = "core_config_data";

/// Record source backed by a SQLite configuration table
pub struct TableSource {
    conn: Connection,
    table: String,
    label: String,
}

impl TableSource {
    /// Open a database file read-only
    pub fn open(path: &Path, table: &str) -> ExportResult<Self> {
        validate_table_name(table)?;
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| ExportError::RecordSource(format!("Failed to open {}: {}", path.display(), e)),
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn,
            table: table.to_string(),
            label: format!("table {} in {}", table, path.display()),
        })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection, table: &str) -> ExportResult<Self> {
        validate_table_name(table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
            label: format!("table {}", table),
        })
    }

    /// Build the SELECT statement and its bound parameters
    fn build_query(&self, filters: &RecordFilters) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if !filters.include_paths.is_empty() {
            let ors: Vec<_> = filters
                .include_paths
                .iter()
                .map(|prefix| {
                    params.push(format!("{}%", escape_like(prefix)));
                    "path LIKE ? ESCAPE '\\'"
                })
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
        }

        if !filters.include_scopes.is_empty() {
            let ors: Vec<_> = filters
                .include_scopes
                .iter()
                .map(|scope| {
                    params.push(escape_like(scope));
                    "scope LIKE ? ESCAPE '\\'"
                })
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
        }

        for prefix in &filters.exclude_paths {
            params.push(format!("{}%", escape_like(prefix)));
            clauses.push("path NOT LIKE ? ESCAPE '\\'".to_string());
        }

        let mut sql = format!("SELECT path, scope, scope_id, value FROM {}", self.table);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY path ASC, scope ASC, scope_id ASC");

        (sql, params)
    }
}

impl RecordSource for TableSource {
    fn fetch(&self, filters: &RecordFilters) -> ExportResult<Vec<ConfigRecord>> {
        let (sql, params) = self.build_query(filters);
        debug!(sql = %sql, params = ?params, "Querying config table");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ConfigRecord> {
    Ok(ConfigRecord {
        path: row.get(0)?,
        scope: row.get(1)?,
        scope_id: value_to_string(row.get(2)?).unwrap_or_default(),
        value: value_to_string(row.get(3)?),
    })
}

/// Render a column value as text, keeping NULL distinct
fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

/// Escape LIKE wildcards so filters match literally
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn validate_table_name(table: &str) -> ExportResult<()> {
    let mut chars = table.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ExportError::Config(format!("Invalid table name: {:?}", table)))
    }
}
