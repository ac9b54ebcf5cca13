//! Deletion of redundant copies.
//!
//! # Overview
//!
//! Given an ordered list of paths, this module removes every file whose
//! content already appeared earlier in the list:
//! - Each path is re-hashed at deletion time, so a stale list can never
//!   cause the last copy of some content to be removed
//! - The first path with a given digest survives
//! - A path listed twice is never deleted on its second appearance
//! - Unreadable or changed files are recorded and skipped
//!
//! # Safety
//!
//! Digests may be computed in parallel, but decisions are taken one path at
//! a time in input order. Before each removal both the copy and its survivor
//! are checked against the size and modification time recorded before
//! hashing.
//!
//! # Example
//!
//! ```no_run
//! use dupefind::actions::delete::{delete_duplicates, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/a.txt"), PathBuf::from("/a_copy.txt")];
//! let report = delete_duplicates(&paths, &DeleteConfig::default(), None);
//! println!("{}", report.summary());
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;

use crate::duplicates::finder::{hash_in_pool, StageConfig};
use crate::scanner::{digest_to_hex, Digest, HashError, HashMode, Hasher};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The file could not be hashed, so it is neither kept nor deleted.
    #[error("unreadable file: {0}")]
    UnreadableFile(#[from] HashError),

    /// Removing the file failed.
    #[error("deletion failed for {path}: {source}")]
    DeletionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when reading file metadata.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File changed between hashing and deletion.
    #[error("file modified since it was hashed: {0}")]
    Modified(PathBuf),

    /// The surviving copy changed, so its duplicate is kept.
    #[error("survivor {survivor} changed, keeping {path}")]
    SurvivorChanged { path: PathBuf, survivor: PathBuf },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::UnreadableFile(e) => e.path(),
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Modified(p) => p,
            Self::DeletionFailed { path, .. }
            | Self::SurvivorChanged { path, .. }
            | Self::Io { path, .. } => path,
        }
    }

    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// A file removed (or, in a dry run, selected for removal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedFile {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// The earlier path holding the same content.
    pub survivor: PathBuf,
}

/// Outcome of a deletion pass.
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// First occurrence of each distinct content, kept on disk.
    pub retained: Vec<PathBuf>,
    /// Redundant copies removed.
    pub deleted: Vec<DeletedFile>,
    /// Paths skipped because they were already listed earlier.
    pub repeated: Vec<PathBuf>,
    /// Paths that could not be processed.
    pub failures: Vec<(PathBuf, DeleteError)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether nothing was actually removed.
    pub dry_run: bool,
    /// Whether the pass stopped early on a shutdown request.
    pub interrupted: bool,
}

impl DeletionReport {
    /// Number of files deleted.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Number of failed paths.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every path was processed without error.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.failures.is_empty() {
            format!(
                "{} {} file(s), kept {}, freed {}",
                verb,
                self.deleted_count(),
                self.retained.len(),
                freed
            )
        } else {
            format!(
                "{} {} file(s), kept {}, {} failed, freed {}",
                verb,
                self.deleted_count(),
                self.retained.len(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Report what would be removed without touching the filesystem.
    pub dry_run: bool,
    /// Check size and modification time before each removal.
    pub verify_unchanged: bool,
    /// Number of threads used for re-hashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify_unchanged: true,
            io_threads: 4,
            shutdown_flag: None,
        }
    }
}

impl DeleteConfig {
    /// Enable/disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable/disable change detection before removal.
    #[must_use]
    pub fn with_verify_unchanged(mut self, verify: bool) -> Self {
        self.verify_unchanged = verify;
        self
    }

    /// Set the number of hashing threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
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
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called when a path is kept as the first copy of its content.
    fn on_retained(&self, _path: &Path) {}

    /// Called after a successful deletion (or a dry-run selection).
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called when a path could not be processed.
    fn on_delete_failure(&self, path: &Path, error: &DeleteError);

    /// Called when the pass completes.
    fn on_complete(&self, _report: &DeletionReport) {}
}

/// File metadata snapshot for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeleteError> {
        let metadata = fs::metadata(path).map_err(|e| DeleteError::from_io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if file was modified, deleted, or can't be accessed.
    pub fn verify(&self) -> Result<(), DeleteError> {
        let current = Self::capture(&self.path)?;

        if let (Some(orig), Some(curr)) = (self.mtime, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since it was hashed: {} (mtime changed)",
                    self.path.display()
                );
                return Err(DeleteError::Modified(self.path.clone()));
            }
        }

        if self.size != current.size {
            log::warn!(
                "File modified since it was hashed: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(DeleteError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// What happens to one path of a deletion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// First path with this content; kept.
    Keep,
    /// Redundant copy of the entry at index `survivor`.
    Delete { survivor: usize },
    /// The same file as an earlier entry; left alone.
    Repeated,
    /// Could not be hashed; left alone.
    Unreadable,
}

/// Decide the fate of each entry, in order.
///
/// Entries are `(identity, digest)` pairs where identity is the resolved path
/// of the file and `None` marks an unreadable file. The first entry with a
/// given digest is kept; later entries with that digest are deleted unless
/// they are the same file as an earlier entry.
///
/// # Example
///
/// ```
/// use dupefind::actions::delete::{plan_deletions, Action};
/// use std::path::Path;
///
/// let plan = plan_deletions(&[
///     (Path::new("/a"), Some([1u8; 32])),
///     (Path::new("/b"), Some([2u8; 32])),
///     (Path::new("/a_copy"), Some([1u8; 32])),
///     (Path::new("/a"), Some([1u8; 32])),
/// ]);
///
/// assert_eq!(
///     plan,
///     vec![Action::Keep, Action::Keep, Action::Delete { survivor: 0 }, Action::Repeated]
/// );
/// ```
#[must_use]
pub fn plan_deletions(entries: &[(&Path, Option<Digest>)]) -> Vec<Action> {
    let mut seen_paths: HashSet<&Path> = HashSet::new();
    let mut survivors: HashMap<Digest, usize> = HashMap::new();

    entries
        .iter()
        .enumerate()
        .map(|(index, (identity, digest))| {
            if !seen_paths.insert(identity) {
                return Action::Repeated;
            }
            match digest {
                None => Action::Unreadable,
                Some(d) => match survivors.get(d) {
                    Some(&survivor) => Action::Delete { survivor },
                    None => {
                        survivors.insert(*d, index);
                        Action::Keep
                    }
                },
            }
        })
        .collect()
}

/// Permanently remove one file.
///
/// # Errors
///
/// Returns [`DeleteError::DeletionFailed`] if the removal fails.
pub fn remove_file(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("Delete failed for {}: {}", path.display(), e);
        DeleteError::DeletionFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

struct Candidate {
    path: PathBuf,
    identity: PathBuf,
    snapshot: Option<FileSnapshot>,
}

/// Delete every file whose content already appeared earlier in `paths`.
///
/// Processes all paths, recording per-file errors in the report instead of
/// stopping.
///
/// # Arguments
///
/// * `paths` - Paths in priority order; earlier paths survive
/// * `config` - Deletion configuration
/// * `callback` - Optional progress callback
///
/// # Example
///
/// ```no_run
/// use dupefind::actions::delete::{delete_duplicates, DeleteConfig};
/// use std::path::PathBuf;
///
/// let paths = vec![
///     PathBuf::from("/a.txt"),
///     PathBuf::from("/b.txt"),
///     PathBuf::from("/a_copy.txt"),
/// ];
///
/// let report = delete_duplicates(&paths, &DeleteConfig::default().with_dry_run(true), None);
/// for file in &report.deleted {
///     println!("{} duplicates {}", file.path.display(), file.survivor.display());
/// }
/// ```
pub fn delete_duplicates(
    paths: &[PathBuf],
    config: &DeleteConfig,
    callback: Option<&dyn DeleteProgressCallback>,
) -> DeletionReport {
    let mut report = DeletionReport {
        dry_run: config.dry_run,
        ..Default::default()
    };

    // Snapshots are taken before hashing so a change during hashing is caught
    let candidates: Vec<Candidate> = paths
        .iter()
        .map(|path| Candidate {
            path: path.clone(),
            identity: fs::canonicalize(path).unwrap_or_else(|_| path.clone()),
            snapshot: FileSnapshot::capture(path).ok(),
        })
        .collect();

    let mut hasher = Hasher::new();
    let mut stage = StageConfig::default().with_io_threads(config.io_threads);
    if let Some(ref flag) = config.shutdown_flag {
        hasher = hasher.with_shutdown_flag(flag.clone());
        stage = stage.with_shutdown_flag(flag.clone());
    }

    log::info!("Re-hashing {} files before deletion", candidates.len());
    let hashed = hash_in_pool(
        candidates,
        |c: &Candidate| c.path.as_path(),
        &hasher,
        HashMode::Full,
        &stage,
        "verify",
    );

    let entries: Vec<(&Path, Option<Digest>)> = hashed
        .iter()
        .map(|(c, result)| (c.identity.as_path(), result.as_ref().ok().copied()))
        .collect();
    let plan = plan_deletions(&entries);

    for (index, action) in plan.into_iter().enumerate() {
        if config.is_shutdown_requested() {
            log::info!("Deletion interrupted after {} of {} paths", index, hashed.len());
            report.interrupted = true;
            break;
        }

        let (candidate, result) = &hashed[index];
        match action {
            Action::Keep => {
                log::debug!("Keeping {}", candidate.path.display());
                if let Some(cb) = callback {
                    cb.on_retained(&candidate.path);
                }
                report.retained.push(candidate.path.clone());
            }
            Action::Repeated => {
                log::debug!("Already handled: {}", candidate.path.display());
                report.repeated.push(candidate.path.clone());
            }
            Action::Unreadable => {
                let error = match result {
                    Err(e) => DeleteError::UnreadableFile(e.clone()),
                    Ok(_) => DeleteError::NotFound(candidate.path.clone()),
                };
                log::warn!("Skipping {}: {}", candidate.path.display(), error);
                if let Some(cb) = callback {
                    cb.on_delete_failure(&candidate.path, &error);
                }
                report.failures.push((candidate.path.clone(), error));
            }
            Action::Delete { survivor } => {
                let (kept, _) = &hashed[survivor];
                match delete_copy(candidate, kept, config) {
                    Ok(size) => {
                        if let Ok(digest) = result {
                            log::info!(
                                "{} {} (same content as {}, {})",
                                if config.dry_run { "Would delete" } else { "Deleted" },
                                candidate.path.display(),
                                kept.path.display(),
                                digest_to_hex(digest)
                            );
                        }
                        if let Some(cb) = callback {
                            cb.on_delete_success(&candidate.path, size);
                        }
                        report.bytes_freed += size;
                        report.deleted.push(DeletedFile {
                            path: candidate.path.clone(),
                            size,
                            survivor: kept.path.clone(),
                        });
                    }
                    Err(error) => {
                        if let Some(cb) = callback {
                            cb.on_delete_failure(&candidate.path, &error);
                        }
                        report.failures.push((candidate.path.clone(), error));
                    }
                }
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&report);
    }

    log::info!("{}", report.summary());

    report
}

fn delete_copy(
    candidate: &Candidate,
    survivor: &Candidate,
    config: &DeleteConfig,
) -> Result<u64, DeleteError> {
    if config.verify_unchanged {
        let snapshot = candidate
            .snapshot
            .as_ref()
            .ok_or_else(|| DeleteError::Modified(candidate.path.clone()))?;
        snapshot.verify()?;

        let survivor_intact = survivor
            .snapshot
            .as_ref()
            .is_some_and(|s| s.verify().is_ok());
        if !survivor_intact {
            return Err(DeleteError::SurvivorChanged {
                path: candidate.path.clone(),
                survivor: survivor.path.clone(),
            });
        }
    }

    let size = candidate.snapshot.as_ref().map_or(0, |s| s.size);
    if !config.dry_run {
        remove_file(&candidate.path)?;
    }
    Ok(size)
}
