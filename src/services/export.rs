//! Export orchestration
//!
//! Drives one export invocation:
//! resolve encoder -> fetch records -> shape -> encode -> write -> report.
//!
//! Format resolution and record fetching fail the whole invocation before
//! anything is written. Encode and write failures are attributed to their
//! file, and the remaining files are still attempted.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use super::shaper;
use crate::error::{ExportError, ExportResult};
use crate::export::{FormatEncoder, FormatRegistry, DEFAULT_FORMAT};
use crate::models::{ConfigRecord, ShapedDocument};
use crate::source::{RecordFilters, RecordSource};
use crate::storage::FileSink;

/// Timestamp layout used in default file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Everything one export invocation needs to know
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Path and scope filters passed to the record source
    pub filters: RecordFilters,

    /// Format name, matched case-insensitively
    pub format: String,

    /// Shape by path segments instead of full paths
    pub hierarchical: bool,

    /// Write one file per namespace
    pub file_per_namespace: bool,

    /// Base name override; the format extension is appended
    pub filename: Option<PathBuf>,

    /// Directory for default timestamped file names
    pub output_dir: PathBuf,

    /// Encode everything but write nothing
    pub dry_run: bool,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            filters: RecordFilters::default(),
            format: DEFAULT_FORMAT.to_string(),
            hierarchical: false,
            file_per_namespace: false,
            filename: None,
            output_dir: PathBuf::from("var"),
            dry_run: false,
        }
    }
}

/// Outcome of writing one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Target file
    pub path: PathBuf,

    /// Namespace for per-namespace exports
    pub namespace: Option<String>,

    /// Number of records exported into the file
    pub records: usize,

    /// Encoded size in bytes
    pub bytes: usize,

    /// Failure reason, if the file could not be produced
    pub error: Option<String>,

    /// Whether the write was skipped on purpose
    pub dry_run: bool,
}

impl FileOutcome {
    /// Whether the file was produced (or would have been, in a dry run)
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// One-line, human-readable result
    pub fn message(&self) -> String {
        match &self.error {
            Some(reason) => format!("Failed to write: {} ({})", self.path.display(), reason),
            None if self.dry_run => format!(
                "Would write: {} settings to file {}",
                self.records,
                self.path.display()
            ),
            None => format!(
                "Wrote: {} settings to file {}",
                self.records,
                self.path.display()
            ),
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Aggregate result of an export invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Format the files were encoded with
    pub format: String,

    /// One entry per attempted file
    pub files: Vec<FileOutcome>,
}

impl ExportReport {
    /// Whether every file was written
    pub fn is_success(&self) -> bool {
        self.files.iter().all(FileOutcome::is_success)
    }

    /// Process exit status: 0 when every file was written, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Records across all successfully written files
    pub fn total_records(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.is_success())
            .map(|f| f.records)
            .sum()
    }

    /// Files that failed
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.is_success())
    }
}

/// Service running exports against injected collaborators
pub struct ExportService<'a> {
    source: &'a dyn RecordSource,
    sink: &'a dyn FileSink,
    registry: &'a FormatRegistry,
}

impl<'a> ExportService<'a> {
    /// Create a new export service
    pub fn new(
        source: &'a dyn RecordSource,
        sink: &'a dyn FileSink,
        registry: &'a FormatRegistry,
    ) -> Self {
        Self {
            source,
            sink,
            registry,
        }
    }

    /// Run one export
    ///
    /// `now` is used for default timestamped file names.
    pub fn run(&self, request: &ExportRequest, now: NaiveDateTime) -> ExportResult<ExportReport> {
        let encoder = self.registry.resolve(&request.format)?;

        info!(
            format = encoder.name(),
            hierarchical = request.hierarchical,
            file_per_namespace = request.file_per_namespace,
            source = %self.source.describe(),
            "Starting export"
        );

        if request.filters.is_empty() {
            info!("No path or scope filters given, exporting every setting");
        }
        let records = self.source.fetch(&request.filters)?;
        info!(records = records.len(), "Fetched config records");

        let base = base_file_name(request, encoder.file_extension(), now);
        let mut report = ExportReport {
            format: encoder.name().to_string(),
            files: Vec::new(),
        };

        if request.file_per_namespace {
            for bucket in shaper::bucket(&records) {
                let path = namespace_file_name(&base, &bucket.namespace);
                let outcome = self.emit(
                    encoder.as_ref(),
                    path,
                    Some(bucket.namespace),
                    &bucket.records,
                    request,
                );
                report.files.push(outcome);
            }
        } else {
            let outcome = self.emit(encoder.as_ref(), base, None, &records, request);
            report.files.push(outcome);
        }

        info!(
            files = report.files.len(),
            failed = report.failures().count(),
            records = report.total_records(),
            "Export finished"
        );

        Ok(report)
    }

    /// Shape, encode and write one file
    fn emit(
        &self,
        encoder: &dyn FormatEncoder,
        path: PathBuf,
        namespace: Option<String>,
        records: &[ConfigRecord],
        request: &ExportRequest,
    ) -> FileOutcome {
        let document: ShapedDocument = shaper::shape(records, request.hierarchical);
        let mut outcome = FileOutcome {
            path,
            namespace,
            records: records.len(),
            bytes: 0,
            error: None,
            dry_run: request.dry_run,
        };

        let bytes = match encoder.encode(&document) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %outcome.path.display(), error = %e, "Failed to encode export");
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        outcome.bytes = bytes.len();

        if request.dry_run {
            info!(path = %outcome.path.display(), bytes = outcome.bytes, "Dry run, skipping write");
            return outcome;
        }

        match self.sink.write(&outcome.path, &bytes) {
            Ok(()) => {
                info!(
                    path = %outcome.path.display(),
                    records = outcome.records,
                    bytes = outcome.bytes,
                    "Wrote export file"
                );
            }
            Err(e) => {
                warn!(path = %outcome.path.display(), error = %e, "Failed to write export file");
                outcome.error = Some(match e {
                    ExportError::Write { reason, .. } => reason,
                    other => other.to_string(),
                });
            }
        }

        outcome
    }
}

/// Single-file target: the override plus extension, or a timestamped default
pub fn base_file_name(request: &ExportRequest, extension: &str, now: NaiveDateTime) -> PathBuf {
    match &request.filename {
        Some(name) => PathBuf::from(format!("{}.{}", name.display(), extension)),
        None => request.output_dir.join(format!(
            "config_{}.{}",
            now.format(FILE_TIMESTAMP_FORMAT),
            extension
        )),
    }
}

/// Insert `_<namespace>` before the last extension of a file name
pub fn namespace_file_name(base: &Path, namespace: &str) -> PathBuf {
    let file_name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, namespace, ext),
        None => format!("{}_{}", file_name, namespace),
    };
    base.with_file_name(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{JsonEncoder, YamlEncoder};
    use crate::source::MemorySource;
    use crate::storage::FsSink;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    fn rec(path: &str, scope: &str, scope_id: &str, value: &str) -> ConfigRecord {
        ConfigRecord::new(path, scope, scope_id, Some(value.to_string()))
    }

    fn sample_records() -> Vec<ConfigRecord> {
        vec![
            rec("general/store_information/name", "default", "0", "Acme"),
            rec("general/store_information/phone", "default", "0", "555"),
            rec("catalog/frontend/list_mode", "default", "0", "grid"),
            rec("catalog/frontend/list_mode", "stores", "1", "list"),
        ]
    }

    /// Sink that keeps written files in memory and fails on chosen paths
    #[derive(Default)]
    struct MemorySink {
        written: RefCell<Vec<(PathBuf, Vec<u8>)>>,
        fail_containing: Option<&'static str>,
    }

    impl FileSink for MemorySink {
        fn write(&self, path: &Path, bytes: &[u8]) -> ExportResult<()> {
            if let Some(needle) = self.fail_containing {
                if path.to_string_lossy().contains(needle) {
                    return Err(ExportError::write_failed(path, "disk full"));
                }
            }
            self.written
                .borrow_mut()
                .push((path.to_path_buf(), bytes.to_vec()));
            Ok(())
        }
    }

    /// Source that counts fetches and can be made to fail
    struct CountingSource {
        inner: MemorySource,
        fetches: Cell<usize>,
        fail: bool,
    }

    impl CountingSource {
        fn new(records: Vec<ConfigRecord>) -> Self {
            Self {
                inner: MemorySource::new(records),
                fetches: Cell::new(0),
                fail: false,
            }
        }
    }

    impl RecordSource for CountingSource {
        fn fetch(&self, filters: &RecordFilters) -> ExportResult<Vec<ConfigRecord>> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail {
                return Err(ExportError::RecordSource("connection refused".into()));
            }
            self.inner.fetch(filters)
        }

        fn describe(&self) -> String {
            "counting".into()
        }
    }

    #[test]
    fn test_single_file_default_name() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            output_dir: PathBuf::from("/srv/var"),
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();

        assert_eq!(report.format, "yaml");
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.files.len(), 1);
        assert_eq!(
            report.files[0].path,
            PathBuf::from("/srv/var/config_20250115_090507.yaml")
        );
        assert_eq!(report.files[0].records, 4);
        assert_eq!(
            report.files[0].message(),
            "Wrote: 4 settings to file /srv/var/config_20250115_090507.yaml"
        );

        let written = sink.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(report.files[0].bytes, written[0].1.len());
        let doc = YamlEncoder.decode(&written[0].1).unwrap();
        assert_eq!(doc, shaper::shape(&source.fetch(&RecordFilters::default()).unwrap(), false));
    }

    #[test]
    fn test_filename_override_gets_extension() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            format: "JSON".into(),
            filename: Some(PathBuf::from("exports/store")),
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();
        assert_eq!(report.files[0].path, PathBuf::from("exports/store.json"));
    }

    #[test]
    fn test_file_per_namespace() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            format: "json".into(),
            hierarchical: true,
            file_per_namespace: true,
            output_dir: PathBuf::from("out"),
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();

        let paths: Vec<_> = report.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("out/config_20250115_090507_catalog.json"),
                PathBuf::from("out/config_20250115_090507_general.json"),
            ]
        );
        assert_eq!(report.files[0].namespace.as_deref(), Some("catalog"));
        assert_eq!(report.files[0].records, 2);
        assert_eq!(report.total_records(), 4);

        for (path, bytes) in sink.written.borrow().iter() {
            let doc = JsonEncoder.decode(bytes).unwrap();
            let ShapedDocument::Hierarchical(tree) = doc else {
                panic!("expected hierarchical document in {}", path.display());
            };
            assert_eq!(tree.len(), 1, "{} holds more than one namespace", path.display());
        }
    }

    #[test]
    fn test_namespace_suffix_with_override() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            format: "csv".into(),
            file_per_namespace: true,
            filename: Some(PathBuf::from("backup.v2/settings")),
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();
        let paths: Vec<_> = report.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("backup.v2/settings_catalog.csv"),
                PathBuf::from("backup.v2/settings_general.csv"),
            ]
        );
    }

    #[test]
    fn test_unknown_format_fails_before_fetch() {
        let source = CountingSource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            format: "xml-doesnotexist".into(),
            ..ExportRequest::default()
        };
        let err = service.run(&request, now()).unwrap_err();

        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
        assert!(err.is_setup_failure());
        assert_eq!(source.fetches.get(), 0);
        assert!(sink.written.borrow().is_empty());
    }

    #[test]
    fn test_source_failure_writes_nothing() {
        let mut source = CountingSource::new(sample_records());
        source.fail = true;
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let err = service.run(&ExportRequest::default(), now()).unwrap_err();
        assert!(matches!(err, ExportError::RecordSource(_)));
        assert_eq!(source.fetches.get(), 1);
        assert!(sink.written.borrow().is_empty());
    }

    #[test]
    fn test_write_failure_continues_with_other_namespaces() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink {
            fail_containing: Some("_catalog"),
            ..MemorySink::default()
        };
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            file_per_namespace: true,
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(!report.is_success());
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(report.files[0]
            .message()
            .starts_with("Failed to write: var/config_20250115_090507_catalog.yaml"));
        assert!(report.files[1].is_success());
        assert_eq!(report.total_records(), 2);

        let written = sink.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(
            written[0].0,
            PathBuf::from("var/config_20250115_090507_general.yaml")
        );
    }

    #[test]
    fn test_filters_reach_source() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            format: "json".into(),
            filters: RecordFilters::from_lists(Some("general"), None, None),
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();
        assert_eq!(report.files[0].records, 2);

        let written = sink.written.borrow();
        let doc = JsonEncoder.decode(&written[0].1).unwrap();
        assert!(doc.entries().iter().all(|e| e.path.starts_with("general")));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let source = MemorySource::new(sample_records());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let request = ExportRequest {
            dry_run: true,
            file_per_namespace: true,
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();

        assert!(sink.written.borrow().is_empty());
        assert_eq!(report.exit_code(), 0);
        assert!(report.files.iter().all(|f| f.bytes > 0));
        assert!(report.files[0].message().starts_with("Would write: 2 settings"));
    }

    #[test]
    fn test_empty_export() {
        let source = MemorySource::new(Vec::new());
        let sink = MemorySink::default();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &sink, &registry);

        let report = service.run(&ExportRequest::default(), now()).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].records, 0);
        assert_eq!(sink.written.borrow().len(), 1);

        let request = ExportRequest {
            file_per_namespace: true,
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_table_source_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("store.sqlite");
        {
            let conn = rusqlite::Connection::open(&db_path).unwrap();
            crate::source::table::tests::seed(&conn);
        }
        let source = crate::source::TableSource::open(&db_path, "core_config_data").unwrap();
        let registry = FormatRegistry::new();
        let service = ExportService::new(&source, &FsSink, &registry);

        let request = ExportRequest {
            format: "xml".into(),
            file_per_namespace: true,
            filters: RecordFilters::from_lists(None, Some("design"), None),
            output_dir: temp_dir.path().join("var"),
            ..ExportRequest::default()
        };
        let report = service.run(&request, now()).unwrap();

        let namespaces: Vec<_> = report
            .files
            .iter()
            .filter_map(|f| f.namespace.clone())
            .collect();
        assert_eq!(namespaces, vec!["catalog", "general", "general_extra", "web"]);
        for file in &report.files {
            assert!(file.path.exists(), "{} missing", file.path.display());
        }
    }

    #[test]
    fn test_namespace_file_name() {
        assert_eq!(
            namespace_file_name(Path::new("var/config_1.yaml"), "web"),
            PathBuf::from("var/config_1_web.yaml")
        );
        assert_eq!(
            namespace_file_name(Path::new("a.b.c.json"), "dev"),
            PathBuf::from("a.b.c_dev.json")
        );
        assert_eq!(
            namespace_file_name(Path::new("plain"), "dev"),
            PathBuf::from("plain_dev")
        );
    }
}
