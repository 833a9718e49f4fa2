//! File fingerprinting using SHA-256
//!
//! A fingerprint identifies the bytes of a log file so that a re-run can tell
//! an unchanged file from one that was appended to or rewritten. Content is
//! hashed in fixed-size chunks, so memory use does not grow with file size.
//!
//! When the content cannot be read, a fingerprint is derived from the path,
//! modification time and size instead. That keeps the file distinguishable
//! across runs at the cost of missing same-size, same-mtime rewrites.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::warn;

/// Read buffer size for streaming hashes
const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded digest identifying a file's content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a stored fingerprint value
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a file
///
/// Falls back to [`metadata_fingerprint`] when the content cannot be hashed.
/// Only fails if neither the content nor the metadata can be read.
pub fn fingerprint(path: &Path) -> io::Result<Fingerprint> {
    match content_fingerprint(path) {
        Ok(fp) => Ok(fp),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not hash file, using metadata fingerprint");
            metadata_fingerprint(path)
        }
    }
}

/// Hash the full content of a file
pub fn content_fingerprint(path: &Path) -> io::Result<Fingerprint> {
    let file = File::open(path)?;
    hash_reader(file)
}

/// Hash everything readable from `reader` in fixed-size chunks
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    Ok(Fingerprint(format!("{:x}", hasher.finalize())))
}

/// Fingerprint derived from path, modification time and size
pub fn metadata_fingerprint(path: &Path) -> io::Result<Fingerprint> {
    let meta = fs::metadata(path)?;
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| format!("{}.{:09}", d.as_secs(), d.subsec_nanos()))
        .unwrap_or_default();

    let key = format!("{}:{}:{}", path.display(), mtime, meta.len());
    let digest = Sha256::digest(key.as_bytes());
    Ok(Fingerprint(format!("{:x}", digest)))
}
