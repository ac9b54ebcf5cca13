//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Phase 1 - Size grouping**: Group files by size (see [`crate::duplicates::groups`] module)
//! 2. **Phase 2 - Partial hash**: Hash the first 1 KiB of same-size files, key by (size, digest)
//! 3. **Phase 3 - Full hash**: Hash entire content of partial-hash matches
//!
//! Each phase completes before the next one starts, since group membership
//! is the product of the previous phase. Inside a phase, files are hashed in
//! parallel on a bounded rayon pool. A file that cannot be read is excluded
//! from the phase and recorded as an error; it never aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Walker, WalkerConfig, FileRecord, Hasher};
//! use dupefind::duplicates::{group_by_size, phase2_partial, StageConfig};
//! use std::path::Path;
//!
//! // Phase 1: Collect and group files by size
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<FileRecord> = walker.walk().filter_map(Result::ok).collect();
//! let (size_groups, size_stats) = group_by_size(files);
//!
//! // Phase 2: Compute partial digests for potential duplicates
//! let hasher = Hasher::new();
//! let (partial_groups, partial_stats) =
//!     phase2_partial(size_groups, &hasher, &StageConfig::default());
//!
//! println!("Phase 2: {} potential duplicates remain", partial_stats.potential_duplicates);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::groups::{
    group_by_size, sort_by_ordinal, EquivalenceClass, PartialGroups, PartialKey, SizeGroups,
};
use crate::progress::ProgressCallback;
use crate::scanner::{
    digest_to_hex, Digest, FileRecord, HashError, HashMode, Hasher, ScanError, Walker,
    WalkerConfig,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Configuration shared by the hashing phases.
#[derive(Clone)]
pub struct StageConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl StageConfig {
    /// Create a new configuration with custom I/O thread count.
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

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Run `f` inside a rayon pool limited to `io_threads` threads.
///
/// Falls back to the global pool if a dedicated pool cannot be built.
pub(crate) fn run_in_pool<F, R>(io_threads: usize, f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(io_threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(f),
        Err(e) => {
            log::warn!(
                "Failed to create I/O thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            f()
        }
    }
}

/// Hash a batch of items in parallel, preserving input order.
///
/// `path_of` extracts the path to read from each item. Items hashed after a
/// shutdown request resolve to [`HashError::Interrupted`].
pub(crate) fn hash_in_pool<T, P>(
    items: Vec<T>,
    path_of: P,
    hasher: &Hasher,
    mode: HashMode,
    config: &StageConfig,
    phase: &str,
) -> Vec<(T, Result<Digest, HashError>)>
where
    T: Send,
    P: Fn(&T) -> &Path + Sync,
{
    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(phase, items.len());
    }

    let results = run_in_pool(config.io_threads, || {
        items
            .into_par_iter()
            .enumerate()
            .map(|(idx, item)| {
                let path = path_of(&item);
                if config.is_shutdown_requested() {
                    let err = HashError::Interrupted(path.to_path_buf());
                    return (item, Err(err));
                }

                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
                }

                let result = hasher.hash_file(path, mode);
                match &result {
                    Ok(digest) => {
                        log::trace!("{:?} digest {}: {}", mode, digest_to_hex(digest), path.display());
                    }
                    Err(HashError::Interrupted(_)) => {}
                    Err(e) => log::warn!("Failed to hash {}: {}", path.display(), e),
                }
                (item, result)
            })
            .collect()
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(phase);
    }

    results
}

/// Statistics from the partial-hash phase.
#[derive(Debug, Clone, Default)]
pub struct PartialStats {
    /// Total files that entered Phase 2
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Errors encountered during partial hashing
    pub errors: Vec<HashError>,
    /// Number of files with a (size, partial digest) key shared by no other file
    pub unique_partials: usize,
    /// Number of files that could still be duplicates
    pub potential_duplicates: usize,
    /// Number of partial groups with 2+ files
    pub duplicate_groups: usize,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

impl PartialStats {
    /// Percentage of files eliminated by partial hash comparison.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files - self.potential_duplicates;
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Group files by partial digest within size groups (Phase 2).
///
/// For each size group of 2+ files, computes the digest of the first 1 KiB
/// of each member and groups by [`PartialKey`]. Groups left with a single
/// member are dropped.
///
/// # Arguments
///
/// * `size_groups` - Files grouped by size from Phase 1
/// * `hasher` - The hasher to use for computing partial digests
/// * `config` - Configuration for the phase
///
/// # Returns
///
/// A tuple of:
/// - `PartialGroups` - Files grouped by (size, partial digest), only groups with 2+ files
/// - `PartialStats` - Statistics about the partial-hash operation
///
/// # Example
///
/// ```no_run
/// use dupefind::scanner::{FileRecord, Hasher};
/// use dupefind::duplicates::{group_by_size, phase2_partial, StageConfig};
///
/// let files: Vec<FileRecord> = vec![];
/// let (size_groups, _) = group_by_size(files);
///
/// let (partial_groups, stats) =
///     phase2_partial(size_groups, &Hasher::new(), &StageConfig::default());
///
/// println!("Phase 2: {:.1}% eliminated by partial hash", stats.elimination_rate());
/// ```
#[must_use]
pub fn phase2_partial(
    size_groups: SizeGroups,
    hasher: &Hasher,
    config: &StageConfig,
) -> (PartialGroups, PartialStats) {
    let mut all_files: Vec<FileRecord> = size_groups
        .into_values()
        .filter(|files| files.len() > 1)
        .flatten()
        .collect();
    sort_by_ordinal(&mut all_files);

    let mut stats = PartialStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (HashMap::new(), stats);
    }

    log::info!("Phase 2: Computing partial digests for {} files", all_files.len());

    let results = hash_in_pool(
        all_files,
        |f: &FileRecord| f.path.as_path(),
        hasher,
        HashMode::Partial,
        config,
        "partial",
    );

    let mut groups: PartialGroups = HashMap::new();
    for (file, result) in results {
        match result {
            Ok(digest) => {
                stats.hashed_files += 1;
                groups
                    .entry(PartialKey::new(file.size, digest))
                    .or_default()
                    .push(file);
            }
            Err(HashError::Interrupted(_)) => stats.interrupted = true,
            Err(e) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    if stats.interrupted || config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 2: Interrupted by shutdown signal");
    }

    let filtered: PartialGroups = groups
        .into_iter()
        .filter_map(|(key, mut files)| {
            if files.len() < 2 {
                stats.unique_partials += files.len();
                return None;
            }
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            sort_by_ordinal(&mut files);
            log::debug!(
                "Partial group {} ({} bytes): {} potential duplicates",
                digest_to_hex(&key.digest),
                key.size,
                files.len()
            );
            Some((key, files))
        })
        .collect();

    log::info!(
        "Phase 2 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.input_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered, stats)
}

/// Statistics from full hash phase.
#[derive(Debug, Clone, Default)]
pub struct FullStats {
    /// Total files that entered Phase 3
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Errors encountered during full hash
    pub errors: Vec<HashError>,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Number of confirmed equivalence classes
    pub duplicate_groups: usize,
    /// Number of files belonging to a confirmed class
    pub confirmed_files: usize,
    /// Number of confirmed duplicate files (excluding representatives)
    pub duplicate_files: usize,
    /// Total space wasted by duplicates
    pub wasted_space: u64,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

impl FullStats {
    /// Fill in class-derived counters.
    pub fn calculate_wasted_space(&mut self, classes: &[EquivalenceClass]) {
        self.duplicate_groups = classes.len();
        self.confirmed_files = classes.iter().map(EquivalenceClass::len).sum();
        self.duplicate_files = classes.iter().map(EquivalenceClass::duplicate_count).sum();
        self.wasted_space = classes.iter().map(EquivalenceClass::wasted_space).sum();
    }
}

/// Compute full digests for partial-hash groups (Phase 3).
///
/// Files are processed in ordinal order. The first file with a digest not yet
/// seen in the run becomes the representative of that digest's class; every
/// later file with the same digest is recorded as its duplicate.
///
/// # Arguments
///
/// * `partial_groups` - Files grouped by (size, partial digest) from Phase 2
/// * `hasher` - The hasher to use for computing full digests
/// * `config` - Configuration for the phase
///
/// # Returns
///
/// A tuple of:
/// - `Vec<EquivalenceClass>` - Confirmed classes, ordered by representative
/// - `FullStats` - Statistics about the full hash operation
#[must_use]
pub fn phase3_full(
    partial_groups: PartialGroups,
    hasher: &Hasher,
    config: &StageConfig,
) -> (Vec<EquivalenceClass>, FullStats) {
    let mut all_files: Vec<FileRecord> = partial_groups
        .into_values()
        .filter(|files| files.len() > 1)
        .flatten()
        .collect();
    sort_by_ordinal(&mut all_files);

    let mut stats = FullStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Phase 3: No files to process");
        return (Vec::new(), stats);
    }

    log::info!("Phase 3: Computing full digests for {} files", all_files.len());

    for file in all_files.iter().filter(|f| f.size > LARGE_FILE_THRESHOLD) {
        log::debug!(
            "Hashing large file ({} MB): {}",
            file.size / (1024 * 1024),
            file.path.display()
        );
    }

    let results = hash_in_pool(
        all_files,
        |f: &FileRecord| f.path.as_path(),
        hasher,
        HashMode::Full,
        config,
        "fullhash",
    );

    // Results arrive in ordinal order, so the first push per digest is the
    // representative.
    let mut classes: HashMap<Digest, Vec<FileRecord>> = HashMap::new();
    for (file, result) in results {
        match result {
            Ok(digest) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                let members = classes.entry(digest).or_default();
                if let Some(representative) = members.first() {
                    log::debug!(
                        "Duplicate found: {} ---> {}",
                        file.path.display(),
                        representative.path.display()
                    );
                }
                members.push(file);
            }
            Err(HashError::Interrupted(_)) => stats.interrupted = true,
            Err(e) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    if stats.interrupted || config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Phase 3: Interrupted by shutdown signal");
    }

    let mut confirmed: Vec<EquivalenceClass> = classes
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(digest, files)| {
            let size = files.first().map_or(0, |f| f.size);
            EquivalenceClass::new(digest, size, files)
        })
        .collect();
    confirmed.sort_by_key(|c| c.representative().map(|f| f.ordinal));

    stats.calculate_wasted_space(&confirmed);

    log::info!(
        "Phase 3 complete: {} classes, {} duplicates, {} bytes reclaimable",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space
    );

    (confirmed, stats)
}

// ============================================================================
// ScanContext - per-run state
// ============================================================================

/// State owned by a single scan.
///
/// Holds everything that accumulates while a run walks its roots, so two
/// runs never share hidden state.
#[derive(Debug, Default)]
pub struct ScanContext {
    /// Canonical paths already recorded in this run
    seen_paths: HashSet<PathBuf>,
    /// Errors encountered while walking
    pub scan_errors: Vec<ScanError>,
    /// Paths skipped because they resolved to an already-recorded file
    pub aliased_paths: usize,
}

impl ScanContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every root in order and collect their files.
    ///
    /// A canonical path reached twice (via a link, or from two overlapping
    /// roots) is kept once, at its first ordinal.
    pub fn walk_roots(
        &mut self,
        roots: &[PathBuf],
        walker_config: &WalkerConfig,
        shutdown_flag: Option<&Arc<AtomicBool>>,
    ) -> Vec<FileRecord> {
        let mut files = Vec::new();

        for (root_index, root) in roots.iter().enumerate() {
            let mut walker = Walker::new(root, walker_config.clone()).with_root_index(root_index);
            if let Some(flag) = shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }

            for result in walker.walk() {
                match result {
                    Ok(file) => {
                        if self.seen_paths.insert(file.path.clone()) {
                            files.push(file);
                        } else {
                            log::trace!("Already recorded: {}", file.path.display());
                            self.aliased_paths += 1;
                        }
                    }
                    Err(e) => self.scan_errors.push(e),
                }
            }
        }

        files
    }
}

/// Check that every root exists and is a directory.
///
/// # Errors
///
/// Returns the first failing root as [`FinderError::InputNotFound`] or
/// [`FinderError::NotADirectory`].
pub fn validate_roots(roots: &[PathBuf]) -> Result<(), FinderError> {
    for root in roots {
        if !root.exists() {
            return Err(FinderError::InputNotFound(root.clone()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.clone()));
        }
    }
    Ok(())
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Hashing phase configuration.
    pub stage: StageConfig,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("stage", &self.stage)
            .finish()
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.stage = self.stage.with_io_threads(threads);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stage = self.stage.with_shutdown_flag(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.stage = self.stage.with_progress_callback(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
///
/// The candidate counters shrink monotonically:
/// `confirmed_files <= partial_candidates <= size_candidates <= total_files`.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Files sharing their size with at least one other file (stage 1 output)
    pub size_candidates: usize,
    /// Files sharing (size, partial digest) with another file (stage 2 output)
    pub partial_candidates: usize,
    /// Files in a confirmed equivalence class (stage 3 output)
    pub confirmed_files: usize,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files eliminated by partial hash
    pub eliminated_by_partial: usize,
    /// Total bytes read by the full-hash phase
    pub bytes_hashed: u64,
    /// Number of confirmed equivalence classes
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding representatives)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Paths skipped because they resolved to a file already recorded
    pub aliased_paths: usize,
    /// Duration of the entire scan
    pub scan_duration: std::time::Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Files excluded because they could not be read
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Number of files excluded from classification.
    #[must_use]
    pub fn skipped_files(&self) -> usize {
        self.scan_errors.len()
    }

    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    InputNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The provided path is not a regular file.
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// A file the caller asked about could not be hashed.
    #[error(transparent)]
    Unreadable(#[from] HashError),
}

/// Duplicate finder that orchestrates the multi-phase detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupefind::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
/// let roots = vec![PathBuf::from("/data/photos"), PathBuf::from("/backup/photos")];
///
/// let (classes, summary) = finder.find_in_paths(&roots).unwrap();
/// println!("Found {} duplicate classes", classes.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.stage.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under a single root.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::find_in_paths`].
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<EquivalenceClass>, ScanSummary), FinderError> {
        self.find_in_paths(&[path.to_path_buf()])
    }

    /// Find all duplicate files across one or more roots.
    ///
    /// Roots are validated before any scanning begins. Files are ordered by
    /// (root order, walk order), which decides every class representative.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - A root does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    pub fn find_in_paths(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<EquivalenceClass>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        validate_roots(roots)?;

        if roots.is_empty() {
            log::warn!("No paths provided for scanning");
            return Ok((Vec::new(), ScanSummary::default()));
        }

        if self.config.stage.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.stage.progress_callback {
            callback.on_phase_start("walking", 0);
        }
        for root in roots {
            log::info!("Walking {}", root.display());
        }

        let mut context = ScanContext::new();
        let files = context.walk_roots(
            roots,
            &self.config.walker_config,
            self.config.stage.shutdown_flag.as_ref(),
        );

        if let Some(ref callback) = self.config.stage.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.stage.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut summary = ScanSummary {
            aliased_paths: context.aliased_paths,
            scan_errors: context.scan_errors,
            ..Default::default()
        };
        let classes = self.run_stages(files, &mut summary)?;
        summary.scan_duration = start_time.elapsed();
        Ok((classes, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Use this method when the records come from another source. Ordinals on
    /// the records decide representatives.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_in_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<EquivalenceClass>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary::default();
        let classes = self.run_stages(files, &mut summary)?;
        summary.scan_duration = start_time.elapsed();
        Ok((classes, summary))
    }

    fn run_stages(
        &self,
        files: Vec<FileRecord>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<EquivalenceClass>, FinderError> {
        summary.total_files = files.len();
        summary.total_size = files.iter().map(|f| f.size).sum();

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        // Phase 1: Group by size
        let (size_groups, size_stats) = group_by_size(files);
        summary.size_candidates = size_stats.potential_duplicates;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Phase 1 complete: {} → {} files ({:.1}% eliminated)",
            size_stats.total_files,
            size_stats.potential_duplicates,
            size_stats.elimination_rate()
        );

        if self.config.stage.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            return Ok(Vec::new());
        }

        // Phase 2: Partial hash comparison
        let (partial_groups, partial_stats) =
            phase2_partial(size_groups, &self.hasher, &self.config.stage);

        summary.partial_candidates = partial_stats.potential_duplicates;
        summary.eliminated_by_partial = partial_stats.unique_partials;
        summary
            .scan_errors
            .extend(partial_stats.errors.into_iter().map(ScanError::from));

        if partial_stats.interrupted || self.config.stage.is_shutdown_requested() {
            summary.interrupted = true;
            return Err(FinderError::Interrupted);
        }
        if partial_groups.is_empty() {
            return Ok(Vec::new());
        }

        // Phase 3: Full hash comparison
        let (classes, full_stats) = phase3_full(partial_groups, &self.hasher, &self.config.stage);

        summary
            .scan_errors
            .extend(full_stats.errors.into_iter().map(ScanError::from));

        if full_stats.interrupted || self.config.stage.is_shutdown_requested() {
            summary.interrupted = true;
            return Err(FinderError::Interrupted);
        }

        summary.confirmed_files = full_stats.confirmed_files;
        summary.bytes_hashed = full_stats.bytes_hashed;
        summary.duplicate_groups = full_stats.duplicate_groups;
        summary.duplicate_files = full_stats.duplicate_files;
        summary.reclaimable_space = full_stats.wasted_space;

        log::info!(
            "Scan complete: {} duplicate classes, {} duplicate files, {} reclaimable, {} skipped",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.skipped_files()
        );

        Ok(classes)
    }
}
