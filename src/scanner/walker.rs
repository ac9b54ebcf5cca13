//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one input root
//! and collecting [`FileRecord`]s for duplicate detection.
//!
//! # Features
//!
//! - Parallel directory reading via jwalk, children sorted by name so the
//!   walk order is the same on every platform
//! - Symlinked files resolved to their canonical target
//! - Sentinel file names (e.g. `.DS_Store`) skipped by name
//! - Optional extension filter
//! - Unreadable entries yielded as [`ScanError`] values instead of aborting
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileRecord, Ordinal, ScanError, WalkerConfig};

/// Directory walker for one input root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Index of this root among all roots of the run
    root_index: usize,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            root_index: 0,
            config,
            shutdown_flag: None,
        }
    }

    /// Set the index of this root, used as the major key of every ordinal.
    #[must_use]
    pub fn with_root_index(mut self, index: usize) -> Self {
        self.root_index = index;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    /// Check whether a file name is excluded by the sentinel list.
    fn is_skipped_name(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy())
            .is_some_and(|name| self.config.skip_names.iter().any(|s| *s == name))
    }

    /// Check if a file passes the extension filter.
    fn passes_extension_filter(&self, path: &Path) -> bool {
        match self.config.normalized_extension() {
            None => true,
            Some(wanted) => path
                .extension()
                .map(|e| e.to_string_lossy())
                .is_some_and(|ext| ext == wanted),
        }
    }

    /// Walk the directory tree, yielding file records in deterministic order.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Directory symlinks are not descended into; file symlinks
    /// are resolved to their canonical target.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let mut next_index = 0usize;

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    return Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }));
                }
            };

            if entry.file_type().is_dir() {
                return None;
            }

            let path = entry.path();
            if self.is_skipped_name(&path) {
                log::trace!("Skipping sentinel file: {}", path.display());
                return None;
            }
            if !self.passes_extension_filter(&path) {
                log::trace!("Skipping file due to extension filter: {}", path.display());
                return None;
            }

            match self.resolve(path) {
                Ok(Some((canonical, size))) => {
                    let ordinal = Ordinal::new(self.root_index, next_index);
                    next_index += 1;
                    Some(Ok(FileRecord::new(canonical, size, ordinal)))
                }
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            }
        })
    }

    /// Resolve a walked path to its canonical form and size.
    ///
    /// Returns `Ok(None)` for anything that is not a regular file once
    /// symlinks are followed (e.g. a link to a directory).
    fn resolve(&self, path: PathBuf) -> Result<Option<(PathBuf, u64)>, ScanError> {
        let canonical = match std::fs::canonicalize(&path) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Skipping unresolvable path {}: {}", path.display(), e);
                return Err(ScanError::from_io(path, e));
            }
        };

        let metadata = match std::fs::metadata(&canonical) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Skipping unreadable file {}: {}", canonical.display(), e);
                return Err(ScanError::from_io(canonical, e));
            }
        };

        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some((canonical, metadata.len())))
    }
}
