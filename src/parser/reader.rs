//! Transparent opening of plain and gzip-compressed logs

use crate::content::Compression;
use crate::error::{ParseError, ParseResult};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read buffer size for log files
const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Boxed line reader over a log file
pub type LogReader = Box<dyn BufRead>;

/// Open a log file for line reading
///
/// `.gz` files are decompressed on the fly; anything else is read as text.
/// The file handle is owned by the returned reader and closed when it drops.
pub fn open_log(path: &Path) -> ParseResult<LogReader> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: LogReader = match Compression::from_path(path) {
        Compression::Gzip => Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        )),
        Compression::None => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)),
    };

    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn test_open_plain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conn.log");
        std::fs::write(&path, "plain text\n").unwrap();

        let mut out = String::new();
        open_log(&path).unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "plain text\n");
    }

    #[test]
    fn test_open_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conn.log.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&path).unwrap(), flate2::Compression::default());
        enc.write_all(b"compressed text\n").unwrap();
        enc.finish().unwrap();

        let mut out = String::new();
        open_log(&path).unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "compressed text\n");
    }

    #[test]
    fn test_open_missing() {
        let dir = tempdir().unwrap();
        let err = open_log(&dir.path().join("missing.log")).err().unwrap();
        assert!(matches!(err, ParseError::Open { .. }));
    }
}
