//! zeek-ingest - Incremental Zeek Log Importer
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use zeek_ingest::config::{CliArgs, IngestConfig};
use zeek_ingest::progress::print_summary;
use zeek_ingest::{import, logging};

fn main() -> ExitCode {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Validate and create config
    let config = match IngestConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Route log output until the process exits, fatal errors included
    let _log_guard = match logging::install(&config.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: Failed to set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: IngestConfig) -> Result<()> {
    if config.used_deprecated_directory {
        warn!("--directory is deprecated, use --logs-dir instead");
    }

    info!("{}", "=".repeat(60));
    info!("Zeek Logs to SQLite - Starting");
    info!("{}", "=".repeat(60));

    let show_progress = config.show_progress;
    let database_path = config.database_path.clone();
    let db_display = database_path.display().to_string();

    let stats = import(config).context("Import failed")?;

    info!("{}", "=".repeat(60));
    info!("Processing complete!");
    info!("  Total files processed: {}", stats.files_processed);
    info!("  Total files skipped: {}", stats.files_skipped);
    info!("  Total rows imported: {}", stats.rows_imported);
    info!("  Database: {}", db_display);
    info!("{}", "=".repeat(60));

    if show_progress {
        let db_size = std::fs::metadata(&database_path).ok().map(|m| m.len());
        print_summary(&stats, &db_display, db_size);
    }

    if stats.files_failed > 0 {
        info!(errors = stats.files_failed, "Import completed with errors");
    }

    Ok(())
}
