//! Per-file, per-directory and per-run import driver
//!
//! The [`Ingestor`] owns the single database connection for the whole run.
//! Files are handled strictly one after another:
//!
//! ```text
//! for dir in dirs:                         (as resolved, newest first)
//!   for file in sorted(*.log, *.log.gz):
//!     table       = name before first '.'
//!     fingerprint = sha256(content) | sha256(path:mtime:size)
//!     skip if (path, fingerprint) recorded
//!     open + scan to #fields            -> skip if none
//!     BEGIN
//!       CREATE TABLE IF NOT EXISTS
//!       INSERT rows in batches
//!       UPSERT _processed_files
//!     COMMIT
//! ```
//!
//! A failing file rolls back its own transaction and is counted as skipped;
//! it never stops its siblings.

use crate::config::IngestConfig;
use crate::content::{checksum, is_log_file_name, table_name_for_path};
use crate::db::schema::{self, keys};
use crate::db::{tables, tracker};
use crate::discovery::resolve_inputs;
use crate::error::{DbResult, FileResult, Result, RowsImported, SkipReason};
use crate::ingest::stats::IngestStats;
use crate::parser::{LogFile, LogRecord};
use crate::progress::{print_header, ProgressReporter};
use chrono::Utc;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives one import run against one database
pub struct Ingestor {
    conn: Connection,
    config: IngestConfig,
    progress: Option<ProgressReporter>,
}

impl Ingestor {
    /// Open the configured database and prepare its bookkeeping tables
    pub fn open(config: IngestConfig) -> DbResult<Self> {
        info!("Opening database: {}", config.database_path.display());
        let conn = schema::open_database(&config.database_path)?;
        Ok(Self::with_connection(conn, config))
    }

    /// Wrap an already prepared connection
    ///
    /// The caller is responsible for having run `schema::create_database`.
    pub fn with_connection(conn: Connection, config: IngestConfig) -> Self {
        let progress = config.show_progress.then(ProgressReporter::new);
        Self {
            conn,
            config,
            progress,
        }
    }

    /// The underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Import every directory in order and return the totals
    ///
    /// Only bookkeeping writes can fail the run; file-level problems are
    /// logged and counted.
    pub fn run(&self, dirs: &[PathBuf]) -> DbResult<IngestStats> {
        let start = Instant::now();

        schema::set_ingest_info(&self.conn, keys::SCHEMA_VERSION, &schema::SCHEMA_VERSION.to_string())?;
        schema::set_ingest_info(&self.conn, keys::INGEST_VERSION, env!("CARGO_PKG_VERSION"))?;
        schema::set_ingest_info(&self.conn, keys::LAST_RUN_START, &Utc::now().to_rfc3339())?;
        schema::set_ingest_info(&self.conn, keys::LAST_RUN_STATUS, "running")?;

        let mut total = IngestStats::default();
        for dir in dirs {
            self.suspended(|| info!("Processing directory: {}", dir.display()));
            let stats = self.process_directory_with_totals(dir, &total);
            self.suspended(|| {
                info!(
                    "  Processed: {} files, Skipped: {} files, Rows: {}",
                    stats.files_processed, stats.files_skipped, stats.rows_imported
                )
            });
            total.merge(&stats);
        }
        total.duration = start.elapsed();

        schema::set_ingest_info(&self.conn, keys::LAST_RUN_END, &Utc::now().to_rfc3339())?;
        schema::set_ingest_info(&self.conn, keys::LAST_RUN_FILES, &total.files_processed.to_string())?;
        schema::set_ingest_info(&self.conn, keys::LAST_RUN_ROWS, &total.rows_imported.to_string())?;
        schema::set_ingest_info(&self.conn, keys::LAST_RUN_STATUS, "completed")?;
        schema::optimize_for_reads(&self.conn)?;

        info!(
            files_processed = total.files_processed,
            files_skipped = total.files_skipped,
            files_failed = total.files_failed,
            rows_imported = total.rows_imported,
            duration_secs = total.duration.as_secs_f64(),
            "Processing complete"
        );

        Ok(total)
    }

    /// Import all recognized log files in one directory
    pub fn process_directory(&self, dir: &Path) -> IngestStats {
        self.process_directory_with_totals(dir, &IngestStats::default())
    }

    fn process_directory_with_totals(&self, dir: &Path, before: &IngestStats) -> IngestStats {
        let mut stats = IngestStats::default();

        if !dir.is_dir() {
            self.suspended(|| warn!("Not a directory: {}", dir.display()));
            return stats;
        }

        let files = match list_log_files(dir) {
            Ok(files) => files,
            Err(e) => {
                self.suspended(|| error!("Failed to list {}: {}", dir.display(), e));
                return stats;
            }
        };
        stats.dirs_processed = 1;

        for path in files {
            if let Some(ref p) = self.progress {
                let mut running = before.clone();
                running.merge(&stats);
                p.update(&path.display().to_string(), &running);
            }

            let outcome = self.process_file(&path);
            self.suspended(|| log_outcome(&path, &outcome));
            stats.record(&outcome);
        }

        stats
    }

    /// Import a single log file
    ///
    /// Table creation, row inserts and the tracking record share one
    /// transaction, which is rolled back on any error.
    pub fn process_file(&self, path: &Path) -> FileResult {
        let table = table_name_for_path(path)
            .ok_or_else(|| SkipReason::Unreadable("file name is not valid UTF-8".to_string()))?;
        if schema::is_reserved_table(&table) {
            return Err(SkipReason::ReservedTable(table));
        }

        let fingerprint =
            checksum::fingerprint(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        if tracker::is_already_imported(&self.conn, path, &fingerprint)? {
            return Err(SkipReason::AlreadyImported);
        }

        let log = LogFile::open(path)?;
        if !log.has_header() {
            return Err(SkipReason::NoHeader);
        }
        let columns = log.schema().columns().to_vec();

        let missing = tables::missing_columns(&self.conn, &table, &columns)?;
        if !missing.is_empty() {
            return Err(SkipReason::SchemaMismatch { table, missing });
        }

        let tx = self.conn.unchecked_transaction()?;
        tables::ensure_table(&tx, &table, &columns)?;

        let batch_size = self.config.batch_size.max(1);
        let mut batch: Vec<LogRecord> = Vec::with_capacity(batch_size.min(4096));
        let mut rows = 0u64;
        for record in log.into_rows() {
            batch.push(record?);
            if batch.len() >= batch_size {
                rows += tables::bulk_insert(&tx, &table, &columns, batch.drain(..))?;
            }
        }
        rows += tables::bulk_insert(&tx, &table, &columns, batch)?;

        tracker::record_import(&tx, path, &fingerprint, rows)?;
        tx.commit()?;

        Ok(RowsImported { table, rows })
    }

    /// Stop the spinner, if one is shown
    pub fn finish_progress(&self) {
        if let Some(ref p) = self.progress {
            p.finish_and_clear();
        }
    }

    /// Run `f` with the spinner hidden so its log lines are not overdrawn
    fn suspended<F: FnOnce()>(&self, f: F) {
        match self.progress {
            Some(ref p) => p.suspend(f),
            None => f(),
        }
    }
}

/// Resolve the configured inputs and import them into the configured database
///
/// Fails only when no directory resolves or the database cannot be opened or
/// updated. Problems with individual files are counted in the returned stats.
pub fn import(config: IngestConfig) -> Result<IngestStats> {
    let dirs = resolve_inputs(&config.inputs, config.days)?;

    info!("Found {} directory(ies) to process:", dirs.len());
    for d in &dirs {
        info!("  - {}", d.display());
    }
    if config.show_progress {
        print_header(dirs.len(), &config.database_path.display().to_string());
    }

    let ingestor = Ingestor::open(config)?;
    let result = ingestor.run(&dirs);
    ingestor.finish_progress();

    Ok(result?)
}

/// Regular files with a recognized log suffix, sorted by name
pub fn list_log_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(is_log_file_name)
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn log_outcome(path: &Path, outcome: &FileResult) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match outcome {
        Ok(imported) => info!("{}: {}", name, imported),
        Err(SkipReason::AlreadyImported) => {
            debug!("Skipping already processed file: {}", path.display())
        }
        Err(SkipReason::NoHeader) => warn!("No columns found in {}, skipping", path.display()),
        Err(reason) => error!("Error processing {}: {}", path.display(), reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_database;
    use crate::error::IngestError;
    use tempfile::tempdir;

    const CONN_LOG: &str = "#separator \\x09\n\
                            #path\tconn\n\
                            #fields\tts\tuid\tid.orig_h\n\
                            #types\ttime\tstring\taddr\n\
                            1.0\tC1\t10.0.0.1\n\
                            2.0\tC2\t10.0.0.2\n\
                            #close\t2025-01-01-01-00-00\n";

    fn ingestor(batch_size: usize) -> Ingestor {
        let conn = Connection::open_in_memory().unwrap();
        create_database(&conn).unwrap();
        let mut config = IngestConfig::new(":memory:");
        config.batch_size = batch_size;
        Ingestor::with_connection(conn, config)
    }

    #[test]
    fn test_process_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conn.log");
        fs::write(&path, CONN_LOG).unwrap();

        let ing = ingestor(1000);
        let imported = ing.process_file(&path).unwrap();
        assert_eq!(imported.table, "conn");
        assert_eq!(imported.rows, 2);

        assert_eq!(
            tables::table_columns(ing.connection(), "conn").unwrap(),
            vec!["ts", "uid", "id_orig_h"]
        );
        assert_eq!(ing.process_file(&path), Err(SkipReason::AlreadyImported));
    }

    #[test]
    fn test_small_batches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conn.log");
        let mut content = String::from("#fields\tts\tuid\n");
        for i in 0..25 {
            content.push_str(&format!("{}\tC{}\n", i, i));
        }
        fs::write(&path, content).unwrap();

        let ing = ingestor(10);
        assert_eq!(ing.process_file(&path).unwrap().rows, 25);
        assert_eq!(tables::row_count(ing.connection(), "conn").unwrap(), 25);
    }

    #[test]
    fn test_header_only_file_is_recorded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weird.log");
        fs::write(&path, "#fields\tts\tname\n#close\tx\n").unwrap();

        let ing = ingestor(1000);
        assert_eq!(ing.process_file(&path).unwrap().rows, 0);
        assert!(tables::table_exists(ing.connection(), "weird").unwrap());
        let record = tracker::get_record(ing.connection(), &path).unwrap().unwrap();
        assert_eq!(record.rows_imported, 0);
    }

    #[test]
    fn test_schema_mismatch() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("dns.00:00:00-01:00:00.log");
        let second = dir.path().join("dns.01:00:00-02:00:00.log");
        fs::write(&first, "#fields\tts\tquery\n1\ta.example\n").unwrap();
        fs::write(&second, "#fields\tts\tquery\trcode\n2\tb.example\t0\n").unwrap();

        let ing = ingestor(1000);
        ing.process_file(&first).unwrap();
        let err = ing.process_file(&second).unwrap_err();
        assert_eq!(
            err,
            SkipReason::SchemaMismatch {
                table: "dns".into(),
                missing: vec!["rcode".into()],
            }
        );
        assert!(tracker::get_record(ing.connection(), &second).unwrap().is_none());
    }

    #[test]
    fn test_process_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("conn.log"), CONN_LOG).unwrap();
        fs::write(dir.path().join("empty.log"), "no header\n").unwrap();
        fs::write(dir.path().join("notes.txt"), CONN_LOG).unwrap();

        let ing = ingestor(1000);
        let stats = ing.process_directory(dir.path());
        assert_eq!(stats.dirs_processed, 1);
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_failed, 0);
        assert_eq!(stats.rows_imported, 2);

        let missing = ing.process_directory(&dir.path().join("gone"));
        assert_eq!(missing, IngestStats::default());
    }

    #[test]
    fn test_bookkeeping_table_names_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("_processed_files.log");
        fs::write(&path, "#fields\tfilepath\tfile_hash\n/etc/passwd\tx\n").unwrap();

        let ing = ingestor(1000);
        assert_eq!(
            ing.process_file(&path),
            Err(SkipReason::ReservedTable("_processed_files".into()))
        );
        assert_eq!(tracker::count_records(ing.connection()).unwrap(), 0);

        let info = dir.path().join("_ingest_info.00:00:00-01:00:00.log.gz");
        fs::write(&info, "").unwrap();
        assert!(ing.process_file(&info).unwrap_err().is_failure());
    }

    #[test]
    fn test_import_missing_base_directory() {
        let dir = tempdir().unwrap();
        let mut config = IngestConfig::new(dir.path().join("zeek_logs.db"));
        config.inputs = vec![dir.path().join("nope")];

        let err = import(config).unwrap_err();
        assert!(matches!(err, IngestError::Discovery(_)));
        assert!(!dir.path().join("zeek_logs.db").exists());
    }

    #[test]
    fn test_list_log_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["ssl.log", "conn.log.gz", "notes.txt", "conn.log"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("dir.log")).unwrap();

        let names: Vec<_> = list_log_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["conn.log", "conn.log.gz", "ssl.log"]);
    }
}
