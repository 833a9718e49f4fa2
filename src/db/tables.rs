//! Destination table management
//!
//! Every imported column is stored as TEXT. Zeek field types vary between
//! log versions and many values are sentinels (`-`, `(empty)`), so values are
//! kept exactly as written and typing is left to queries.
//!
//! Once created, a table's column set is never altered.

use crate::db::schema::quote_ident;
use crate::error::{DbError, DbResult};
use crate::parser::LogRecord;
use rusqlite::{params_from_iter, Connection};

/// Create `name` with the given TEXT columns unless it already exists
///
/// A second call for an existing table is a no-op even if `columns` differs.
pub fn ensure_table(conn: &Connection, name: &str, columns: &[String]) -> DbResult<()> {
    if columns.is_empty() {
        return Err(DbError::NoColumns {
            table: name.to_string(),
        });
    }

    let cols = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", quote_ident(name), cols);
    conn.execute(&sql, [])?;

    Ok(())
}

/// Append rows to `name`, binding each record to `columns` by position
///
/// Returns the number of rows inserted. Empty input touches nothing.
pub fn bulk_insert<I>(conn: &Connection, name: &str, columns: &[String], rows: I) -> DbResult<u64>
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return Ok(0);
    }

    let mut stmt = conn.prepare_cached(&insert_sql(name, columns))?;
    let mut inserted = 0u64;
    for row in rows {
        if row.len() != columns.len() {
            return Err(DbError::Schema(format!(
                "row has {} values but {} columns are declared for '{}'",
                row.len(),
                columns.len(),
                name
            )));
        }
        stmt.execute(params_from_iter(row.iter()))?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Check whether a table exists
pub fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Columns of an existing table in declaration order (empty if absent)
pub fn table_columns(conn: &Connection, name: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(name)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Columns in `wanted` that the existing table does not have
///
/// Returns an empty list when the table does not exist yet.
pub fn missing_columns(conn: &Connection, name: &str, wanted: &[String]) -> DbResult<Vec<String>> {
    let existing = table_columns(conn, name)?;
    if existing.is_empty() {
        return Ok(Vec::new());
    }

    Ok(wanted
        .iter()
        .filter(|c| !existing.iter().any(|e| e.eq_ignore_ascii_case(c)))
        .cloned()
        .collect())
}

/// Count rows in a table
pub fn row_count(conn: &Connection, name: &str) -> DbResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn insert_sql(name: &str, columns: &[String]) -> String {
    let col_names = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(name),
        col_names,
        placeholders
    )
}
