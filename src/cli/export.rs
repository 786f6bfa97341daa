//! CLI commands for config export
//!
//! Builds an export request from flags and settings, runs it, and prints
//! one line per file.

use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::config::{ExportPaths, Settings, SourceKind, SourceSettings};
use crate::error::ExportResult;
use crate::export::FormatRegistry;
use crate::services::{ExportReport, ExportRequest, ExportService};
use crate::source::{create_record_source, RecordFilters};
use crate::storage::FsSink;

/// Arguments for `config-export export`
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Output format (see `config-export formats`)
    #[arg(short = 'm', long)]
    pub format: Option<String>,

    /// Nest settings by path segment instead of full path
    #[arg(short = 'a', long)]
    pub hierarchical: bool,

    /// Base file name; the format extension is appended
    #[arg(short = 'f', long)]
    pub filename: Option<PathBuf>,

    /// Comma-separated path prefixes to include
    #[arg(short = 'i', long)]
    pub include: Option<String>,

    /// Comma-separated path prefixes to exclude
    #[arg(short = 'x', long)]
    pub exclude: Option<String>,

    /// Comma-separated scopes to include (default, websites, stores)
    #[arg(long)]
    pub include_scope: Option<String>,

    /// Write one file per namespace
    #[arg(short = 's', long)]
    pub file_per_namespace: bool,

    /// Read from this SQLite database
    #[arg(long, value_name = "PATH", conflicts_with = "snapshot")]
    pub db: Option<PathBuf>,

    /// Table to read when using a database
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Read from a JSON or YAML snapshot
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Directory for timestamped output files
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Encode everything but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Apply source overrides on top of the configured source
    pub fn source_settings(&self, settings: &Settings) -> SourceSettings {
        let mut source = settings.source.clone();
        if let Some(db) = &self.db {
            source.kind = SourceKind::Table;
            source.database = Some(db.clone());
        }
        if let Some(table) = &self.table {
            source.table = table.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            source.kind = SourceKind::Snapshot;
            source.snapshot = Some(snapshot.clone());
        }
        source
    }

    /// Build the export request these flags describe
    pub fn to_request(&self, paths: &ExportPaths, settings: &Settings) -> ExportRequest {
        ExportRequest {
            filters: RecordFilters::from_lists(
                self.include.as_deref(),
                self.exclude.as_deref(),
                self.include_scope.as_deref(),
            ),
            format: self
                .format
                .clone()
                .unwrap_or_else(|| settings.default_format.clone()),
            hierarchical: self.hierarchical,
            file_per_namespace: self.file_per_namespace,
            filename: self.filename.clone(),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| settings.output_dir(paths)),
            dry_run: self.dry_run,
        }
    }
}

/// Handle `config-export export`, returning the process exit code
pub fn handle_export_command(
    paths: &ExportPaths,
    settings: &Settings,
    registry: &FormatRegistry,
    args: &ExportArgs,
) -> ExportResult<i32> {
    let request = args.to_request(paths, settings);

    // Unknown formats fail before the source is opened
    registry.resolve(&request.format)?;

    let source = create_record_source(&args.source_settings(settings))?;
    let service = ExportService::new(source.as_ref(), &FsSink, registry);
    let report = service.run(&request, Local::now().naive_local())?;

    print_report(&report);
    Ok(report.exit_code())
}

fn print_report(report: &ExportReport) {
    if report.files.is_empty() {
        println!("No settings matched; nothing to write.");
        return;
    }

    for file in &report.files {
        if file.is_success() {
            println!("{}", file.message());
        } else {
            eprintln!("{}", file.message());
        }
    }
}

/// Handle `config-export formats`
pub fn handle_formats_command(registry: &FormatRegistry, settings: &Settings) -> ExportResult<()> {
    println!("Available export formats:");
    for name in registry.names() {
        let encoder = registry.resolve(name)?;
        let marker = if name.eq_ignore_ascii_case(&settings.default_format) {
            " (default)"
        } else {
            ""
        };
        println!("  {:<12} .{}{}", name, encoder.file_extension(), marker);
    }
    Ok(())
}
