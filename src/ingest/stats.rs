//! Run counters

use crate::error::FileResult;
use std::time::Duration;

/// Aggregated outcome of a directory or a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Directories walked
    pub dirs_processed: u64,
    /// Files imported (including header-only files with zero rows)
    pub files_processed: u64,
    /// Files not imported: already imported, no header, or failed
    pub files_skipped: u64,
    /// Subset of skipped files that failed with an error
    pub files_failed: u64,
    /// Rows appended across all tables
    pub rows_imported: u64,
    /// Wall time
    pub duration: Duration,
}

impl IngestStats {
    /// Count one file outcome
    pub fn record(&mut self, outcome: &FileResult) {
        match outcome {
            Ok(imported) => {
                self.files_processed += 1;
                self.rows_imported += imported.rows;
            }
            Err(reason) => {
                self.files_skipped += 1;
                if reason.is_failure() {
                    self.files_failed += 1;
                }
            }
        }
    }

    /// Add another set of counters into this one
    pub fn merge(&mut self, other: &IngestStats) {
        self.dirs_processed += other.dirs_processed;
        self.files_processed += other.files_processed;
        self.files_skipped += other.files_skipped;
        self.files_failed += other.files_failed;
        self.rows_imported += other.rows_imported;
    }

    /// Total files looked at
    pub fn files_seen(&self) -> u64 {
        self.files_processed + self.files_skipped
    }

    /// Rows per second over the run
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows_imported as f64 / secs
        } else {
            0.0
        }
    }
}
