//! Zeek TSV log parsing
//!
//! A Zeek ASCII log starts with metadata lines, each prefixed with `#`:
//!
//! ```text
//! #separator \x09
//! #path      conn
//! #fields    ts      uid     id.orig_h       id.orig_p ...
//! #types     time    string  addr            port      ...
//! 1700000000.1    CAbc12  10.0.0.1        51234 ...
//! #close     2024-01-01-00-00-00
//! ```
//!
//! The `#fields` line supplies the column names. Every other `#` line is
//! skipped. Data rows are tab-separated and are normalized to exactly the
//! header's width: short rows are padded with empty strings and long rows are
//! truncated. A malformed row never aborts the file.

use crate::error::{ParseError, ParseResult};
use crate::parser::reader::{open_log, LogReader};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Marker that opens the column declaration line
pub const FIELDS_MARKER: &str = "#fields";

/// Prefix of every metadata or comment line
pub const COMMENT_PREFIX: char = '#';

/// Field separator for both header and data lines
pub const FIELD_SEPARATOR: char = '\t';

/// One normalized data row, as wide as its table's column list
pub type LogRecord = Vec<String>;

/// Ordered, storage-safe column names declared by a log header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<String>,
}

impl TableSchema {
    /// Build a schema from raw header field names
    ///
    /// Dots become underscores (`id.orig_h` -> `id_orig_h`).
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            columns: fields.into_iter().map(column_name).collect(),
        }
    }

    /// Parse a header line, returning None unless it starts with `#fields`
    pub fn from_header_line(line: &str) -> Option<Self> {
        let mut fields = line.split(FIELD_SEPARATOR);
        let first = fields.next()?;
        if !first.starts_with(FIELDS_MARKER) {
            return None;
        }
        Some(Self::from_fields(fields))
    }

    /// Column names in declaration order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no columns were declared
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Map a Zeek field name to a column name
pub fn column_name(field: &str) -> String {
    field.replace('.', "_")
}

/// Split a data line and fit it to `width` fields
pub fn normalize_row(line: &str, width: usize) -> LogRecord {
    let mut record: LogRecord = line
        .split(FIELD_SEPARATOR)
        .take(width)
        .map(str::to_string)
        .collect();
    record.resize(width, String::new());
    record
}

/// A log file positioned just after its header
///
/// Owns the underlying reader; dropping it (or the row iterator made from it)
/// releases the file handle.
pub struct LogFile<R = LogReader> {
    path: PathBuf,
    reader: R,
    schema: TableSchema,
    buf: Vec<u8>,
}

impl LogFile<LogReader> {
    /// Open a plain or gzip log and locate its `#fields` header
    pub fn open(path: &Path) -> ParseResult<Self> {
        let reader = open_log(path)?;
        Self::from_reader(path, reader)
    }
}

impl<R: BufRead> LogFile<R> {
    /// Scan `reader` forward to the first `#fields` line
    ///
    /// If the input ends before a header is found, the schema is empty and
    /// the reader is exhausted.
    pub fn from_reader(path: impl Into<PathBuf>, reader: R) -> ParseResult<Self> {
        let mut file = Self {
            path: path.into(),
            reader,
            schema: TableSchema::default(),
            buf: Vec::with_capacity(4096),
        };

        while let Some(line) = file.next_line()? {
            if let Some(schema) = TableSchema::from_header_line(&line) {
                file.schema = schema;
                break;
            }
        }

        Ok(file)
    }

    /// Columns declared by the header (empty if no header was found)
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// True if a `#fields` line with at least one column was found
    pub fn has_header(&self) -> bool {
        !self.schema.is_empty()
    }

    /// Consume the file into its remaining data rows
    pub fn into_rows(self) -> LogRows<R> {
        LogRows {
            width: self.schema.len(),
            file: self,
            done: false,
        }
    }

    /// Read the next line, lossily decoded, without its line terminator
    fn next_line(&mut self) -> ParseResult<Option<String>> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| ParseError::Read {
                path: self.path.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }

        let mut end = self.buf.len();
        if end > 0 && self.buf[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && self.buf[end - 1] == b'\r' {
            end -= 1;
        }

        Ok(Some(String::from_utf8_lossy(&self.buf[..end]).into_owned()))
    }
}

/// Lazy, single-pass sequence of normalized data rows
///
/// Yields `Err` at most once, then stops.
pub struct LogRows<R = LogReader> {
    file: LogFile<R>,
    width: usize,
    done: bool,
}

impl<R: BufRead> Iterator for LogRows<R> {
    type Item = ParseResult<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.file.next_line() {
                Ok(Some(line)) => {
                    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                        continue;
                    }
                    return Some(Ok(normalize_row(&line, self.width)));
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for LogRows<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufReader, Cursor, Read};

    const SAMPLE: &str = "#separator \\x09\n\
                          #set_separator\t,\n\
                          #path\tconn\n\
                          #fields\tts\tid.orig_h\tid.resp_h\n\
                          #types\ttime\taddr\taddr\n\
                          1.0\t10.0.0.1\t10.0.0.2\n\
                          2.0\t10.0.0.3\n\
                          3.0\t10.0.0.4\t10.0.0.5\textra\tmore\n\
                          #close\t2025-01-01-00-00-00\n";

    fn parse(input: &str) -> LogFile<Cursor<Vec<u8>>> {
        LogFile::from_reader("test.log", Cursor::new(input.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_schema_inference() {
        let log = parse(SAMPLE);
        assert_eq!(log.schema().columns(), &["ts", "id_orig_h", "id_resp_h"]);
        assert!(log.has_header());
    }

    #[test]
    fn test_rows_normalized() {
        let rows: Vec<_> = parse(SAMPLE).into_rows().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["1.0", "10.0.0.1", "10.0.0.2"]);
        assert_eq!(rows[1], vec!["2.0", "10.0.0.3", ""]);
        assert_eq!(rows[2], vec!["3.0", "10.0.0.4", "10.0.0.5"]);
    }

    #[test]
    fn test_no_header() {
        let log = parse("#separator \\x09\n1.0\t2.0\n3.0\t4.0\n");
        assert!(!log.has_header());
        assert!(log.schema().is_empty());
        assert_eq!(log.into_rows().count(), 0);
    }

    #[test]
    fn test_empty_fields_line() {
        let log = parse("#fields\n1\t2\n");
        assert!(!log.has_header());
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let rows: Vec<_> = parse("#fields\ta\tb\r\n\r\nx\ty\r\n\n")
            .into_rows()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows, vec![vec!["x".to_string(), "y".to_string()]]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut input = b"#fields\ta\n".to_vec();
        input.extend_from_slice(b"ok\xff\n");
        let log = LogFile::from_reader("bad.log", Cursor::new(input)).unwrap();
        let rows: Vec<_> = log.into_rows().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].starts_with("ok"));
    }

    #[test]
    fn test_normalize_row() {
        assert_eq!(normalize_row("a\tb", 4), vec!["a", "b", "", ""]);
        assert_eq!(normalize_row("a\tb\tc\td", 2), vec!["a", "b"]);
        assert_eq!(normalize_row("a\t\tc", 3), vec!["a", "", "c"]);
    }

    /// Reader that fails after handing out a prefix
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt deflate stream")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_ends_rows() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"#fields\ta\n1\n".to_vec()),
        });
        let log = LogFile::from_reader("broken.log.gz", reader).unwrap();
        let mut rows = log.into_rows();

        assert_eq!(rows.next().unwrap().unwrap(), vec!["1"]);
        assert!(matches!(rows.next(), Some(Err(ParseError::Read { .. }))));
        assert!(rows.next().is_none());
    }
}
