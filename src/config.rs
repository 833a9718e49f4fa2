//! Configuration types for zeek-ingest
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::logging::{LogConfig, LogLevel};
use clap::Parser;
use std::path::PathBuf;

/// Batch size limits
const MIN_BATCH_SIZE: usize = 100;
const MAX_BATCH_SIZE: usize = 100_000;

/// Default rows per insert batch
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Import Zeek logs into SQLite
#[derive(Parser, Debug, Clone)]
#[command(
    name = "zeek-ingest",
    version,
    about = "Import Zeek logs from date-based directories into SQLite",
    long_about = "Imports Zeek TSV logs (plain or .gz) from YYYY-MM-DD directories into a\n\
                  single SQLite database, one table per log stream.\n\n\
                  Files already imported with unchanged content are skipped, so the\n\
                  importer can run repeatedly from cron against a growing log tree.",
    after_help = "EXAMPLES:\n    \
        # Process all date directories\n    \
        zeek-ingest --logs-dir /opt/zeek/logs --database /var/lib/grafana/data/zeek_logs.db\n\n    \
        # Process only the last 7 days\n    \
        zeek-ingest --logs-dir /opt/zeek/logs --database zeek_logs.db --days 7\n\n    \
        # Process specific directories\n    \
        zeek-ingest --logs-dir /opt/zeek/logs/2025-12-2* --database zeek_logs.db"
)]
pub struct CliArgs {
    /// Base directory of YYYY-MM-DD log directories, or date directories themselves
    #[arg(
        long = "logs-dir",
        env = "ZEEK_LOGS_DIR",
        default_value = "/opt/zeek/logs",
        value_name = "DIR",
        num_args = 1..
    )]
    pub logs_dirs: Vec<PathBuf>,

    /// Deprecated alias for --logs-dir
    #[arg(long, value_name = "DIR", hide = true)]
    pub directory: Option<PathBuf>,

    /// Output database path
    #[arg(
        short = 'o',
        long,
        env = "ZEEK_DATABASE",
        default_value = "/var/lib/grafana/data/zeek_logs.db",
        value_name = "FILE"
    )]
    pub database: PathBuf,

    /// Process only the last N date directories
    #[arg(long, value_name = "N")]
    pub days: Option<usize>,

    /// Also append log output to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Logging level
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Rows per insert batch
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE, value_name = "NUM")]
    pub batch_size: usize,

    /// Show a spinner and a formatted summary
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (same as --log-level debug)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Base or date directories to resolve
    pub inputs: Vec<PathBuf>,

    /// Output database path
    pub database_path: PathBuf,

    /// Limit to the N most recent date directories
    pub days: Option<usize>,

    /// Rows per insert batch
    pub batch_size: usize,

    /// Show progress indicator and formatted summary
    pub show_progress: bool,

    /// Where log output goes and at what level
    pub log: LogConfig,

    /// The deprecated --directory flag was used
    pub used_deprecated_directory: bool,
}

impl IngestConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let used_deprecated_directory = args.directory.is_some();
        let inputs = match args.directory {
            Some(dir) => vec![dir],
            None => args.logs_dirs,
        };
        if inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        if let Some(days) = args.days {
            if days == 0 {
                return Err(ConfigError::InvalidDays { days });
            }
        }

        if args.batch_size < MIN_BATCH_SIZE || args.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: args.batch_size,
                min: MIN_BATCH_SIZE,
                max: MAX_BATCH_SIZE,
            });
        }

        if args.database.as_os_str().is_empty() || args.database.is_dir() {
            return Err(ConfigError::InvalidDatabasePath {
                path: args.database.clone(),
                reason: "Expected a file path".to_string(),
            });
        }

        let level = if args.verbose {
            LogLevel::Debug
        } else {
            args.log_level
        };

        Ok(Self {
            inputs,
            database_path: args.database,
            days: args.days,
            batch_size: args.batch_size,
            show_progress: args.progress,
            log: LogConfig {
                level,
                log_file: args.log_file,
                ansi: true,
            },
            used_deprecated_directory,
        })
    }

    /// Configuration for a single database with default settings
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            inputs: Vec::new(),
            database_path: database_path.into(),
            days: None,
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: false,
            log: LogConfig::default(),
            used_deprecated_directory: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("zeek-ingest").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = IngestConfig::from_args(parse(&["--logs-dir", "/opt/zeek/logs"])).unwrap();
        assert_eq!(config.inputs, vec![PathBuf::from("/opt/zeek/logs")]);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.days, None);
        assert_eq!(config.log.level, LogLevel::Info);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_multiple_logs_dirs() {
        let args = parse(&["--logs-dir", "/logs/2025-01-01", "/logs/2025-01-02", "-o", "x.db"]);
        let config = IngestConfig::from_args(args).unwrap();
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.database_path, PathBuf::from("x.db"));
    }

    #[test]
    fn test_deprecated_directory() {
        let args = parse(&["--directory", "/old/style"]);
        let config = IngestConfig::from_args(args).unwrap();
        assert_eq!(config.inputs, vec![PathBuf::from("/old/style")]);
        assert!(config.used_deprecated_directory);
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let config = IngestConfig::from_args(parse(&["--log-level", "WARNING"])).unwrap();
        assert_eq!(config.log.level, LogLevel::Warning);

        let config = IngestConfig::from_args(parse(&["--log-level", "INFO", "-v"])).unwrap();
        assert_eq!(config.log.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_days() {
        let err = IngestConfig::from_args(parse(&["--days", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDays { .. }));
    }

    #[test]
    fn test_invalid_batch_size() {
        let err = IngestConfig::from_args(parse(&["-b", "5"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize { .. }));
    }
}
