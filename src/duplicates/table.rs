//! Exhaustive per-file digest tables.
//!
//! A [`ResultTable`] lists every file under a root next to its full-content
//! digest, or the unreadable marker when the file could not be hashed. Rows
//! are sorted by key so that the members of one class are contiguous, and
//! walk order is kept inside each class.
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::{duplicates_only, list_all, FinderConfig};
//! use std::path::Path;
//!
//! let table = list_all(Path::new("/data"), &FinderConfig::default(), false).unwrap();
//! for row in duplicates_only(&table).iter() {
//!     println!("{} {}", row.key, row.path.display());
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::finder::{hash_in_pool, validate_roots, FinderConfig, FinderError, ScanContext};
use super::groups::{group_by_size, sort_by_ordinal, EquivalenceClass};
use crate::scanner::{digest_to_hex, hex_to_digest, Digest, FileRecord, HashMode, Hasher};

/// Text written in place of a digest for files that could not be read.
pub const UNREADABLE_MARKER: &str = "No hash could be generated";

/// The key column of a [`TableRow`].
///
/// Unreadable rows sort after every digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKey {
    /// Full-content digest
    Digest(Digest),
    /// The file could not be hashed
    Unreadable,
}

impl RowKey {
    /// The digest, if the file was readable.
    #[must_use]
    pub fn digest(&self) -> Option<&Digest> {
        match self {
            Self::Digest(d) => Some(d),
            Self::Unreadable => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(d) => f.write_str(&digest_to_hex(d)),
            Self::Unreadable => f.write_str(UNREADABLE_MARKER),
        }
    }
}

/// Error returned when a key cell is neither a digest nor the marker.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid hash value: {0}")]
pub struct InvalidRowKey(pub String);

impl FromStr for RowKey {
    type Err = InvalidRowKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == UNREADABLE_MARKER {
            return Ok(Self::Unreadable);
        }
        hex_to_digest(s)
            .map(Self::Digest)
            .ok_or_else(|| InvalidRowKey(s.to_string()))
    }
}

/// One file and its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Path to the file
    pub path: PathBuf,
    /// Digest or unreadable marker
    pub key: RowKey,
}

impl TableRow {
    /// Create a new row.
    #[must_use]
    pub fn new(path: PathBuf, key: RowKey) -> Self {
        Self { path, key }
    }
}

/// Ordered rows of (path, key).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<TableRow>,
}

impl ResultTable {
    /// Create a table from rows, keeping their order.
    #[must_use]
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    /// Flatten equivalence classes into rows, class by class.
    #[must_use]
    pub fn from_classes(classes: &[EquivalenceClass]) -> Self {
        let rows = classes
            .iter()
            .flat_map(|class| {
                class
                    .files
                    .iter()
                    .map(move |f| TableRow::new(f.path.clone(), RowKey::Digest(class.digest)))
            })
            .collect();
        Self { rows }
    }

    /// Rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Consume the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<TableRow> {
        self.rows
    }

    /// Iterate over rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, TableRow> {
        self.rows.iter()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Paths in table order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.rows.iter().map(|r| r.path.clone()).collect()
    }

    /// Number of rows marked unreadable.
    #[must_use]
    pub fn unreadable_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.key == RowKey::Unreadable)
            .count()
    }

    /// Number of distinct digests shared by two or more rows.
    #[must_use]
    pub fn class_count(&self) -> usize {
        digest_counts(&self.rows)
            .values()
            .filter(|&&count| count > 1)
            .count()
    }

    /// Stable sort by key.
    pub fn sort_by_key(&mut self) {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a TableRow;
    type IntoIter = std::slice::Iter<'a, TableRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn digest_counts(rows: &[TableRow]) -> HashMap<Digest, usize> {
    let mut counts = HashMap::new();
    for digest in rows.iter().filter_map(|r| r.key.digest()) {
        *counts.entry(*digest).or_insert(0) += 1;
    }
    counts
}

/// Keep only files that share their size with at least one other file.
///
/// Input order is preserved.
#[must_use]
pub fn preselect(files: Vec<FileRecord>) -> Vec<FileRecord> {
    let (groups, _) = group_by_size(files);
    let mut kept: Vec<FileRecord> = groups.into_values().flatten().collect();
    sort_by_ordinal(&mut kept);
    kept
}

/// Build the exhaustive table for one root.
///
/// Every file gets a full-content digest, with no size or partial pre-filter.
/// With `fast_scan`, only files whose size occurs at least twice are hashed
/// and the rest are left out as implicitly unique.
///
/// # Errors
///
/// Returns [`FinderError`] if the root is missing or not a directory, or if
/// the run is interrupted.
pub fn list_all(
    root: &Path,
    config: &FinderConfig,
    fast_scan: bool,
) -> Result<ResultTable, FinderError> {
    let roots = [root.to_path_buf()];
    validate_roots(&roots)?;

    let mut context = ScanContext::new();
    let mut files = context.walk_roots(
        &roots,
        &config.walker_config,
        config.stage.shutdown_flag.as_ref(),
    );
    if config.stage.is_shutdown_requested() {
        return Err(FinderError::Interrupted);
    }

    if fast_scan {
        let total = files.len();
        files = preselect(files);
        log::info!(
            "Fast scan: {} of {} files share a size with another file",
            files.len(),
            total
        );
    }

    let mut hasher = Hasher::new();
    if let Some(ref flag) = config.stage.shutdown_flag {
        hasher = hasher.with_shutdown_flag(flag.clone());
    }

    log::info!("Hashing {} files under {}", files.len(), root.display());
    let results = hash_in_pool(
        files,
        |f: &FileRecord| f.path.as_path(),
        &hasher,
        HashMode::Full,
        &config.stage,
        "fullhash",
    );

    if config.stage.is_shutdown_requested() {
        return Err(FinderError::Interrupted);
    }

    let mut rows: Vec<TableRow> = results
        .into_iter()
        .map(|(file, result)| {
            let key = result.map_or(RowKey::Unreadable, RowKey::Digest);
            TableRow::new(file.path, key)
        })
        .collect();

    // Entries the walk could not resolve still get a row
    for error in &context.scan_errors {
        log::debug!("Listing unreadable entry: {}", error);
        rows.push(TableRow::new(error.path().to_path_buf(), RowKey::Unreadable));
    }

    let mut table = ResultTable::new(rows);
    table.sort_by_key();
    Ok(table)
}

/// Rows whose digest occurs at least twice, sorted by key.
///
/// Unreadable rows are never part of a class.
#[must_use]
pub fn duplicates_only(table: &ResultTable) -> ResultTable {
    let counts = digest_counts(table.rows());
    let rows = table
        .iter()
        .filter(|row| {
            row.key
                .digest()
                .is_some_and(|d| counts.get(d).copied().unwrap_or(0) > 1)
        })
        .cloned()
        .collect();

    let mut duplicates = ResultTable::new(rows);
    duplicates.sort_by_key();
    duplicates
}

/// Rows selected from one or more tables, with the number of unreadable rows
/// those tables held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedRows {
    /// Selected rows
    pub table: ResultTable,
    /// Files that could not be hashed while building the source tables
    pub unreadable: usize,
}

/// Find the copies of one file inside a folder.
///
/// Returns the rows of `duplicates_only(list_all(folder))` whose digest equals
/// the digest of `file`, along with the folder's unreadable count.
///
/// # Errors
///
/// Returns [`FinderError::InputNotFound`] if `file` does not exist,
/// [`FinderError::NotAFile`] if it is not a regular file, and
/// [`FinderError::Unreadable`] if it cannot be hashed.
pub fn find_copies_of(
    file: &Path,
    folder: &Path,
    config: &FinderConfig,
) -> Result<MatchedRows, FinderError> {
    if !file.exists() {
        return Err(FinderError::InputNotFound(file.to_path_buf()));
    }
    if !file.is_file() {
        return Err(FinderError::NotAFile(file.to_path_buf()));
    }

    let wanted = Hasher::new().full_hash(file)?;
    log::debug!("Looking for copies of {} ({})", file.display(), digest_to_hex(&wanted));

    let table = list_all(folder, config, false)?;
    let rows = duplicates_only(&table)
        .into_rows()
        .into_iter()
        .filter(|row| row.key == RowKey::Digest(wanted))
        .collect();
    Ok(MatchedRows {
        table: ResultTable::new(rows),
        unreadable: table.unreadable_count(),
    })
}
