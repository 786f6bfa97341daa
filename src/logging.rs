//! Logging setup using tracing
//!
//! Log lines go to stderr so they never mix with command output. `RUST_LOG`
//! takes precedence; otherwise the `config_export` target is filtered at the
//! configured level, or at `debug` when verbose output was requested.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::{ExportError, ExportResult};

/// Initialize the global subscriber
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_logging(log_level: &str, verbose: bool) -> ExportResult<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        parse_log_level(log_level)?
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}

fn default_directive(level: Level) -> String {
    format!("config_export={}", level.to_string().to_lowercase())
}

/// Parse log level from string
pub fn parse_log_level(level_str: &str) -> ExportResult<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ExportError::Config(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" INFO ").unwrap(), Level::INFO);
        assert!(parse_log_level("loud").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(Level::WARN), "config_export=warn");
        assert_eq!(default_directive(Level::DEBUG), "config_export=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("warn", false).unwrap();
        init_logging("error", true).unwrap();
    }
}
