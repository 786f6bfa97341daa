//! Record sources
//!
//! A record source yields the configuration records to export, already
//! filtered and ordered by path, then scope, then scope id. Two backends
//! are provided:
//! - `TableSource`: reads a `core_config_data` table from a SQLite database
//! - `SnapshotSource`: reads a JSON or YAML dump of the scoped config tree
//!
//! Which one is used is decided by settings or CLI flags, never by
//! inspecting the store at runtime.

pub mod filters;
pub mod snapshot;
pub mod table;

pub use filters::RecordFilters;
pub use snapshot::SnapshotSource;
pub use table::TableSource;

use crate::config::settings::{SourceKind, SourceSettings};
use crate::error::{ExportError, ExportResult};
use crate::models::ConfigRecord;

/// Provides configuration records for export
pub trait RecordSource {
    /// Fetch every record matching the filters
    ///
    /// Records must be ordered by path, scope, scope id ascending.
    fn fetch(&self, filters: &RecordFilters) -> ExportResult<Vec<ConfigRecord>>;

    /// Human-readable description used in logs
    fn describe(&self) -> String;
}

/// Create the record source selected by the settings
pub fn create_record_source(settings: &SourceSettings) -> ExportResult<Box<dyn RecordSource>> {
    match settings.kind {
        SourceKind::Table => {
            let database = settings.database.as_ref().ok_or_else(|| {
                ExportError::Config("source.database must be set for the table source".into())
            })?;
            tracing::info!(database = %database.display(), table = %settings.table, "Using table record source");
            let source = TableSource::open(database, &settings.table)?;
            Ok(Box::new(source))
        }
        SourceKind::Snapshot => {
            let snapshot = settings.snapshot.as_ref().ok_or_else(|| {
                ExportError::Config("source.snapshot must be set for the snapshot source".into())
            })?;
            tracing::info!(snapshot = %snapshot.display(), "Using snapshot record source");
            Ok(Box::new(SnapshotSource::new(snapshot.clone())))
        }
    }
}

/// Sort records into the order every source guarantees
///
/// Scope ids compare numerically when both sides are integers, matching the
/// integer column in the store.
pub(crate) fn sort_records(records: &mut [ConfigRecord]) {
    records.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.scope.cmp(&b.scope))
            .then_with(
                || match (a.scope_id.parse::<i64>(), b.scope_id.parse::<i64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => a.scope_id.cmp(&b.scope_id),
                },
            )
    });
}

/// An in-memory record source, mostly useful for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<ConfigRecord>,
}

impl MemorySource {
    /// Create a source over the given records
    pub fn new(records: Vec<ConfigRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MemorySource {
    fn fetch(&self, filters: &RecordFilters) -> ExportResult<Vec<ConfigRecord>> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect();
        sort_records(&mut records);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}
