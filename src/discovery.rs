//! Input directory resolution
//!
//! Zeek archives logs into one directory per day:
//!
//! ```text
//! /opt/zeek/logs/
//! ├── 2025-12-27/
//! ├── 2025-12-28/
//! │   ├── conn.00:00:00-01:00:00.log.gz
//! │   └── dns.00:00:00-01:00:00.log.gz
//! └── current -> /opt/zeek/spool/zeek
//! ```
//!
//! Each input path is either a date directory itself or a base directory to
//! search for date directories. A base without date directories that holds
//! log files directly is accepted as a single directory.

use crate::content::is_log_file_name;
use crate::error::DiscoveryError;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Regex for YYYY-MM-DD directory names
static DATE_DIR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date directory regex"));

/// Check whether a directory name is a valid `YYYY-MM-DD` date
pub fn is_date_dir_name(name: &str) -> bool {
    DATE_DIR_REGEX.is_match(name) && NaiveDate::parse_from_str(name, "%Y-%m-%d").is_ok()
}

/// Find date directories under `base`, newest first
///
/// `days` limits the result to the N most recent directories.
pub fn find_date_directories(
    base: &Path,
    days: Option<usize>,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !base.is_dir() {
        return Err(DiscoveryError::BaseNotFound(base.to_path_buf()));
    }

    let entries = fs::read_dir(base).map_err(|source| DiscoveryError::ReadDir {
        path: base.to_path_buf(),
        source,
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %base.display(), error = %e, "Error reading directory entry");
                continue;
            }
        };
        let path = entry.path();
        let is_date = entry
            .file_name()
            .to_str()
            .map(is_date_dir_name)
            .unwrap_or(false);
        if is_date && path.is_dir() {
            dirs.push(path);
        }
    }

    // Names are zero-padded dates, so lexical order is date order
    dirs.sort();
    dirs.reverse();

    if let Some(n) = days {
        dirs.truncate(n);
    }

    Ok(dirs)
}

/// Resolve a single input path into directories to process
pub fn resolve_input(path: &Path, days: Option<usize>) -> Result<Vec<PathBuf>, DiscoveryError> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if is_date_dir_name(name) {
        if path.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }
        warn!(path = %path.display(), "Date directory does not exist");
        return Ok(Vec::new());
    }

    let dirs = find_date_directories(path, days)?;
    if dirs.is_empty() && contains_log_files(path) {
        debug!(path = %path.display(), "No date directories, using directory directly");
        return Ok(vec![path.to_path_buf()]);
    }

    Ok(dirs)
}

/// Resolve all input paths, removing duplicates
///
/// Fails if a base directory is missing or if nothing at all was found.
pub fn resolve_inputs(
    inputs: &[PathBuf],
    days: Option<usize>,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for input in inputs {
        for dir in resolve_input(input, days)? {
            if seen.insert(dir.clone()) {
                dirs.push(dir);
            }
        }
    }

    if dirs.is_empty() {
        return Err(DiscoveryError::NoDirectories(inputs.to_vec()));
    }

    Ok(dirs)
}

fn contains_log_files(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_str()
                    .map(is_log_file_name)
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}
