//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Content hashing with BLAKE3 (full and 1 KiB partial digests)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     extension: Some("txt".to_string()),
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export main types
pub use hasher::{
    digest_to_hex, hex_to_digest, Digest, HashMode, Hasher, CHUNK_SIZE, PARTIAL_HASH_SIZE,
};
pub use walker::Walker;

/// Default file names skipped during a walk (desktop-service sentinel files).
pub const DEFAULT_SKIP_NAMES: &[&str] = &[".DS_Store"];

/// Position of a file in the deterministic walk order.
///
/// Ordinals compare by root index first, then by position within that
/// root's walk. The smallest ordinal in a group is its representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ordinal {
    /// Index of the input root this file was found under
    pub root: usize,
    /// Position within that root's sorted walk
    pub index: usize,
}

impl Ordinal {
    /// Create a new ordinal.
    #[must_use]
    pub fn new(root: usize, index: usize) -> Self {
        Self { root, index }
    }
}

/// A discovered regular file.
///
/// Identity is the canonical (symlink-resolved, absolute) path. Digests are
/// not stored here: each pipeline stage keys its groups by the digest it
/// computed, so a record is never mutated once it has been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Canonical absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Walk position, used as the representative tie-break
    pub ordinal: Ordinal,
}

impl FileRecord {
    /// Create a new FileRecord.
    ///
    /// # Arguments
    ///
    /// * `path` - Canonical path to the file
    /// * `size` - File size in bytes
    /// * `ordinal` - Position in the walk order
    #[must_use]
    pub fn new(path: PathBuf, size: u64, ordinal: Ordinal) -> Self {
        Self {
            path,
            size,
            ordinal,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Only include files with this extension (with or without leading dot).
    pub extension: Option<String>,

    /// File names that are never yielded (e.g. `.DS_Store`).
    pub skip_names: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            extension: None,
            skip_names: DEFAULT_SKIP_NAMES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `extension` - Optional extension filter
    /// * `skip_names` - File names to skip
    #[must_use]
    pub fn new(extension: Option<String>, skip_names: Vec<String>) -> Self {
        Self {
            extension,
            skip_names,
        }
    }

    /// Set the extension filter.
    #[must_use]
    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    /// Normalized extension filter without the leading dot.
    #[must_use]
    pub fn normalized_extension(&self) -> Option<&str> {
        self.extension
            .as_deref()
            .map(|ext| ext.strip_prefix('.').unwrap_or(ext))
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be hashed during one of the pipeline stages.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Classify an I/O error for a path.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// Path of the entry that could not be scanned.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } => path,
            Self::HashError(e) => e.path(),
        }
    }
}

/// Errors that can occur during file hashing.
///
/// Every variant means the file is unreadable for the current stage: the
/// caller excludes it and carries on.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),
}

impl HashError {
    /// Classify an I/O error for a path.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
