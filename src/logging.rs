//! Log output routing
//!
//! Output always goes to stderr. When [`LogConfig::log_file`] is set, the same
//! events are also appended (without ANSI colors) to that file.
//!
//! [`install`] activates the subscriber for the calling thread only and
//! returns a guard; output routing ends when the guard drops. The import
//! pipeline is single-threaded, so every event of a run is captured.

use crate::error::ConfigError;
use clap::ValueEnum;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Where log output goes and at what level
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for this crate's events; other crates log at warn
    pub level: LogLevel,

    /// Optional file receiving a copy of every event
    pub log_file: Option<PathBuf>,

    /// Colorize stderr output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_file: None,
            ansi: true,
        }
    }
}

/// Build the event filter, honoring `RUST_LOG` when set
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("zeek_ingest={},warn", config.level.as_directive()))
    })
}

/// Install the subscriber described by `config` for the current thread
pub fn install(config: &LogConfig) -> Result<DefaultGuard, ConfigError> {
    let file_layer = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| ConfigError::InvalidLogFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigError::InvalidLogFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(false),
        )
        .with(file_layer);

    Ok(tracing::subscriber::set_default(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_receives_events() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("logs/zeek-ingest.log");
        let config = LogConfig {
            level: LogLevel::Info,
            log_file: Some(log_path.clone()),
            ansi: false,
        };

        {
            let _guard = install(&config).unwrap();
            tracing::info!("hello from test");
        }

        let contents = fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("hello from test"));
    }

    #[test]
    fn test_level_directive() {
        assert_eq!(LogLevel::Warning.as_directive(), "warn");
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
    }
}
