use anyhow::Result;
use clap::{Parser, Subcommand};

use config_export::cli::{handle_export_command, handle_formats_command, ExportArgs};
use config_export::config::{ExportPaths, Settings};
use config_export::export::FormatRegistry;
use config_export::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "config-export",
    version,
    about = "Export scoped configuration settings to files",
    long_about = "config-export reads scoped configuration records from a SQLite table \
                  or a JSON/YAML snapshot and writes them as YAML, JSON, CSV, XML or \
                  LimeSoda environment XML, in one file or one file per namespace."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export configuration settings
    Export(ExportArgs),

    /// List available export formats
    Formats,

    /// Show configuration paths and settings
    Config,

    /// Write a default settings file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = ExportPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(&settings.log_level, cli.verbose)?;

    let registry = FormatRegistry::new();

    match cli.command {
        Some(Commands::Export(args)) => {
            let code = handle_export_command(&paths, &settings, &registry, &args)?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Some(Commands::Formats) => {
            handle_formats_command(&registry, &settings)?;
        }
        Some(Commands::Config) => {
            println!("config-export Configuration");
            println!("===========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Output directory: {}", settings.output_dir(&paths).display());
            println!();
            println!("Settings:");
            println!("  Default format: {}", settings.default_format);
            println!("  Log level:      {}", settings.log_level);
            println!("  Source:         {:?}", settings.source.kind);
            if let Some(database) = &settings.source.database {
                println!("  Database:       {}", database.display());
            }
            println!("  Table:          {}", settings.source.table);
            if let Some(snapshot) = &settings.source.snapshot {
                println!("  Snapshot:       {}", snapshot.display());
            }
            if let Err(e) = settings.validate(&registry) {
                println!();
                println!("Warning: {}", e);
            }
        }
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!(
                    "Settings already exist at: {}",
                    paths.settings_file().display()
                );
            } else {
                settings.save(&paths)?;
                println!("Wrote default settings to: {}", paths.settings_file().display());
                println!();
                println!("Set source.database (or source.snapshot) before exporting,");
                println!("or pass --db / --snapshot to 'config-export export'.");
            }
        }
        None => {
            println!("config-export - Export scoped configuration settings");
            println!();
            println!("Run 'config-export --help' for usage information.");
            println!("Run 'config-export formats' to list output formats.");
        }
    }

    Ok(())
}
