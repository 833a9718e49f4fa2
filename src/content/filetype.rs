//! Log file recognition and destination table naming
//!
//! Zeek writes one file per log stream, e.g. `conn.log` for the live file or
//! `conn.17:00:00-18:00:00.log.gz` once it has been rotated and compressed.
//! Only these two suffixes are considered log files.

use std::path::Path;

/// Suffix of a plain log file
pub const LOG_SUFFIX: &str = ".log";

/// Suffix of a gzip-compressed log file
pub const GZ_LOG_SUFFIX: &str = ".log.gz";

/// Compression applied to a log file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain text
    None,
    /// gzip (possibly multi-member)
    Gzip,
}

impl Compression {
    /// Detect compression from the file extension
    ///
    /// Any `.gz` file is treated as gzip; everything else is read as text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "gz" => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

/// Check if a file name has a recognized log suffix
pub fn is_log_file_name(name: &str) -> bool {
    name.ends_with(LOG_SUFFIX) || name.ends_with(GZ_LOG_SUFFIX)
}

/// Derive the destination table name from a log file name
///
/// The `.log` / `.log.gz` suffix is stripped, the remainder is cut at the
/// first `.` (dropping rotation timestamps) and hyphens become underscores.
///
/// # Example
///
/// ```
/// use zeek_ingest::content::filetype::table_name_for;
///
/// assert_eq!(table_name_for("conn.log"), "conn");
/// assert_eq!(table_name_for("conn.17:00:00-18:00:00.log.gz"), "conn");
/// assert_eq!(table_name_for("known-services.log"), "known_services");
/// ```
pub fn table_name_for(file_name: &str) -> String {
    let base = file_name
        .strip_suffix(GZ_LOG_SUFFIX)
        .or_else(|| file_name.strip_suffix(LOG_SUFFIX))
        .unwrap_or(file_name);

    let stream = base.split('.').next().unwrap_or(base);

    stream.replace('-', "_")
}

/// Derive the destination table name for a path
///
/// Returns None if the path has no UTF-8 file name.
pub fn table_name_for_path(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(table_name_for)
}
