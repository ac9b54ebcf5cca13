//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the grouping structures used by the three stages of
//! duplicate detection:
//!
//! - [`SizeGroups`]: files keyed by exact size (stage 1)
//! - [`PartialGroups`]: files keyed by [`PartialKey`], i.e. size plus the
//!   digest of the first 1 KiB (stage 2)
//! - [`EquivalenceClass`]: byte-identical files sharing a full digest (stage 3)
//!
//! Members of every group are kept in ordinal order, so the first member is
//! always the file met first in (root order, walk order).
//!
//! # Example
//!
//! ```
//! use dupefind::scanner::{FileRecord, Ordinal};
//! use dupefind::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024, Ordinal::new(0, 0)),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024, Ordinal::new(0, 1)),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048, Ordinal::new(0, 2)),
//! ];
//!
//! // Group by size - only groups with 2+ files are potential duplicates
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{digest_to_hex, Digest, FileRecord};

/// Files grouped by size in bytes.
pub type SizeGroups = HashMap<u64, Vec<FileRecord>>;

/// Files grouped by size and partial digest.
pub type PartialGroups = HashMap<PartialKey, Vec<FileRecord>>;

/// Composite key of the partial-hash stage.
///
/// The size is kept next to the digest even though every member of a
/// stage-1 group already shares it, so short files with equal prefixes but
/// different lengths can never share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialKey {
    /// File size in bytes
    pub size: u64,
    /// Digest of the first 1 KiB
    pub digest: Digest,
}

impl PartialKey {
    /// Create a new partial key.
    #[must_use]
    pub fn new(size: u64, digest: Digest) -> Self {
        Self { size, digest }
    }
}

/// Sort records into walk order.
pub fn sort_by_ordinal(files: &mut [FileRecord]) {
    files.sort_by_key(|f| f.ordinal);
}

/// A set of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceClass {
    /// BLAKE3 digest of the full content
    pub digest: Digest,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Members in ordinal order; the first one is the representative
    pub files: Vec<FileRecord>,
}

impl EquivalenceClass {
    /// Create a new class. Members are sorted into ordinal order.
    #[must_use]
    pub fn new(digest: Digest, size: u64, mut files: Vec<FileRecord>) -> Self {
        sort_by_ordinal(&mut files);
        Self {
            digest,
            size,
            files,
        }
    }

    /// The member that survives deletion.
    #[must_use]
    pub fn representative(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Every member except the representative.
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or(&[])
    }

    /// Number of files in this class.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this class is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of redundant copies (total - 1 representative).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes reclaimable by removing every redundant copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }

    /// Paths of all members in ordinal order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (stage 1).
///
/// Returns only groups with 2+ members; each group is in ordinal order.
#[must_use]
pub fn group_by_size(files: Vec<FileRecord>) -> (SizeGroups, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        total_size: files.iter().map(|f| f.size).sum(),
        ..Default::default()
    };

    let mut all_groups: SizeGroups = HashMap::new();
    for file in files {
        all_groups.entry(file.size).or_default().push(file);
    }
    stats.unique_sizes = all_groups.len();

    let groups: SizeGroups = all_groups
        .into_iter()
        .filter_map(|(size, mut files)| {
            if files.len() < 2 {
                stats.eliminated_unique += files.len();
                return None;
            }
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            sort_by_ordinal(&mut files);
            Some((size, files))
        })
        .collect();

    log::debug!(
        "Size grouping: {} files, {} distinct sizes, {} potential duplicates",
        stats.total_files,
        stats.unique_sizes,
        stats.potential_duplicates
    );

    (groups, stats)
}
