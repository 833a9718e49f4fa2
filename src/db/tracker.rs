//! Processed-file tracking
//!
//! One row per source path, holding the fingerprint it was last imported
//! with. A path whose stored fingerprint matches is skipped; a path whose
//! fingerprint changed is imported again and its row overwritten.
//!
//! Writes here are the serialization point for any future concurrent
//! importer: the upsert is keyed on the path, so the last writer's record is
//! the one kept and the table is never left with two rows for one path.

use crate::content::Fingerprint;
use crate::error::DbResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// A row of the tracking table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFileRecord {
    /// Source path as given to the importer
    pub path: String,
    /// Fingerprint at the last successful import
    pub fingerprint: Fingerprint,
    /// Time of the last successful import
    pub processed_at: Option<DateTime<Utc>>,
    /// Rows imported by the last successful import
    pub rows_imported: u64,
}

/// Check if `path` was already imported with this exact fingerprint
pub fn is_already_imported(
    conn: &Connection,
    path: &Path,
    fingerprint: &Fingerprint,
) -> DbResult<bool> {
    let stored: Option<Option<String>> = conn
        .query_row(
            "SELECT file_hash FROM _processed_files WHERE filepath = ?1",
            [path_key(path)],
            |row| row.get(0),
        )
        .optional()?;

    Ok(matches!(stored, Some(Some(hash)) if hash == fingerprint.as_str()))
}

/// Record a successful import, replacing any previous record for the path
pub fn record_import(
    conn: &Connection,
    path: &Path,
    fingerprint: &Fingerprint,
    rows_imported: u64,
) -> DbResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO _processed_files (filepath, file_hash, processed_at, rows_imported)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    stmt.execute(params![
        path_key(path),
        fingerprint.as_str(),
        Utc::now().to_rfc3339(),
        rows_imported as i64,
    ])?;
    Ok(())
}

/// Look up the record for a path
pub fn get_record(conn: &Connection, path: &Path) -> DbResult<Option<ProcessedFileRecord>> {
    let record = conn
        .query_row(
            "SELECT filepath, file_hash, processed_at, rows_imported
             FROM _processed_files WHERE filepath = ?1",
            [path_key(path)],
            |row| {
                let processed_at: Option<String> = row.get(2)?;
                let rows: Option<i64> = row.get(3)?;
                Ok(ProcessedFileRecord {
                    path: row.get(0)?,
                    fingerprint: Fingerprint::from_stored(
                        row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    ),
                    processed_at: processed_at.as_deref().and_then(parse_timestamp),
                    rows_imported: rows.unwrap_or(0).max(0) as u64,
                })
            },
        )
        .optional()?;
    Ok(record)
}

/// Number of files ever recorded
pub fn count_records(conn: &Connection) -> DbResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM _processed_files", [], |row| {
        row.get(0)
    })?;
    Ok(count as u64)
}

/// Key under which a path is stored
fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Parse stored timestamps, including the naive ISO form older databases used
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_database;
    use std::path::PathBuf;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_unknown_path_not_imported() {
        let conn = setup();
        let fp = Fingerprint::from_stored("abc");
        assert!(!is_already_imported(&conn, Path::new("/logs/conn.log"), &fp).unwrap());
    }

    #[test]
    fn test_record_and_check() {
        let conn = setup();
        let path = PathBuf::from("/logs/2025-01-01/conn.log");
        let fp = Fingerprint::from_stored("abc");

        record_import(&conn, &path, &fp, 42).unwrap();
        assert!(is_already_imported(&conn, &path, &fp).unwrap());

        let changed = Fingerprint::from_stored("def");
        assert!(!is_already_imported(&conn, &path, &changed).unwrap());
    }

    #[test]
    fn test_record_overwrites() {
        let conn = setup();
        let path = PathBuf::from("/logs/2025-01-01/dns.log");

        record_import(&conn, &path, &Fingerprint::from_stored("v1"), 10).unwrap();
        record_import(&conn, &path, &Fingerprint::from_stored("v2"), 15).unwrap();

        assert_eq!(count_records(&conn).unwrap(), 1);
        let record = get_record(&conn, &path).unwrap().unwrap();
        assert_eq!(record.fingerprint.as_str(), "v2");
        assert_eq!(record.rows_imported, 15);
        assert!(record.processed_at.is_some());
    }

    #[test]
    fn test_legacy_timestamp() {
        let ts = parse_timestamp("2025-12-28T03:15:00.123456").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-12-28T03:15:00.123456+00:00");
    }
}
