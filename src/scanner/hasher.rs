//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests
//! of file contents. Two modes are supported:
//!
//! - [`HashMode::Partial`]: digest of the first [`PARTIAL_HASH_SIZE`] bytes.
//!   Files shorter than that are digested in full, so the partial and full
//!   digests of a short file are identical.
//! - [`HashMode::Full`]: digest of the entire stream, read in
//!   [`CHUNK_SIZE`] chunks so memory use does not grow with file size.
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{digest_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", digest_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Number of leading bytes covered by a partial digest.
pub const PARTIAL_HASH_SIZE: usize = 1024;

/// Read buffer size for full-content hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Which part of a file to digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashMode {
    /// Entire content
    Full,
    /// First [`PARTIAL_HASH_SIZE`] bytes
    Partial,
}

/// Streaming BLAKE3 hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    /// Optional shutdown flag, checked between chunks of a full read
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// A full read in progress stops at the next chunk boundary once the
    /// flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Digest a byte stream.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if reading fails. A shutdown request
    /// surfaces as an error of kind [`io::ErrorKind::Interrupted`].
    pub fn digest<R: Read>(&self, reader: R, mode: HashMode) -> io::Result<Digest> {
        match mode {
            HashMode::Partial => {
                let mut prefix = Vec::with_capacity(PARTIAL_HASH_SIZE);
                reader
                    .take(PARTIAL_HASH_SIZE as u64)
                    .read_to_end(&mut prefix)?;
                Ok(*blake3::hash(&prefix).as_bytes())
            }
            HashMode::Full => self.digest_stream(reader),
        }
    }

    fn digest_stream<R: Read>(&self, mut reader: R) -> io::Result<Digest> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "shutdown requested",
                ));
            }

            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Open a file and digest it in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn hash_file(&self, path: &Path, mode: HashMode) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        self.digest(file, mode).map_err(|e| {
            if e.kind() == io::ErrorKind::Interrupted {
                HashError::Interrupted(path.to_path_buf())
            } else {
                HashError::from_io(path.to_path_buf(), e)
            }
        })
    }

    /// Digest of the first [`PARTIAL_HASH_SIZE`] bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn partial_hash(&self, path: &Path) -> Result<Digest, HashError> {
        self.hash_file(path, HashMode::Partial)
    }

    /// Digest of the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        self.hash_file(path, HashMode::Full)
    }
}

/// Hex representation of a digest (64 lowercase characters).
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}

/// Parse a 64-character hex string back into a digest.
#[must_use]
pub fn hex_to_digest(hex: &str) -> Option<Digest> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
