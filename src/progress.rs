//! Progress reporting for import runs
//!
//! Provides a spinner while files are imported and a formatted summary at
//! the end, using indicatif and console.

use crate::ingest::IngestStats;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner showing the file being imported and running totals
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the display with the current file and totals so far
    pub fn update(&self, current: &str, stats: &IngestStats) {
        let msg = format!(
            "{} | Files: {} | Skipped: {} | Rows: {}",
            current,
            format_number(stats.files_processed),
            format_number(stats.files_skipped),
            format_number(stats.rows_imported),
        );

        self.bar.set_message(msg);
    }

    /// Hide the spinner while `f` writes to the terminal
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the run
pub fn print_summary(stats: &IngestStats, db_path: &str, db_size: Option<u64>) {
    println!();
    println!("{}", style("Import Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(stats.dirs_processed)
    );
    println!(
        "  {} {}",
        style("Files processed:").bold(),
        format_number(stats.files_processed)
    );
    println!(
        "  {} {}",
        style("Files skipped:").bold(),
        format_number(stats.files_skipped)
    );
    println!(
        "  {} {}",
        style("Rows imported:").bold(),
        format_number(stats.rows_imported)
    );
    println!(
        "  {} {:.1}s ({:.0} rows/sec)",
        style("Duration:").bold(),
        stats.duration.as_secs_f64(),
        stats.rows_per_second()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.files_failed)
        );
    }
    if let Some(size) = db_size {
        let db_size_str = format_size(size, BINARY);
        println!("  {} {} ({})", style("Database:").bold(), db_path, db_size_str);
    } else {
        println!("  {} {}", style("Database:").bold(), db_path);
    }
    println!();
}

/// Print a header at the start of the run
pub fn print_header(dirs: usize, output: &str) {
    println!();
    println!(
        "{} {}",
        style("zeek-ingest").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Directories:").bold(), dirs);
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}
