//! Cross-folder comparison.
//!
//! Finds the files of a candidate folder whose content already exists in a
//! reference folder.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::finder::{FinderConfig, FinderError};
use super::table::{list_all, MatchedRows, ResultTable};
use crate::scanner::Digest;

/// Candidate rows whose digest also appears in the reference table.
///
/// Rows keep candidate order and each path appears once, however many
/// reference files share its digest. Unreadable rows never match.
#[must_use]
pub fn compare_tables(reference: &ResultTable, candidate: &ResultTable) -> ResultTable {
    let known: HashSet<&Digest> = reference.iter().filter_map(|r| r.key.digest()).collect();
    let mut seen: HashSet<&Path> = HashSet::new();

    let rows = candidate
        .iter()
        .filter(|row| row.key.digest().is_some_and(|d| known.contains(d)))
        .filter(|row| seen.insert(row.path.as_path()))
        .cloned()
        .collect();

    ResultTable::new(rows)
}

/// Compare two folders by content.
///
/// Both folders are hashed exhaustively before comparing. The unreadable
/// count covers both folders.
///
/// # Errors
///
/// Returns [`FinderError`] if either folder is missing or not a directory, or
/// if the run is interrupted.
pub fn compare_folders(
    reference: &Path,
    candidate: &Path,
    config: &FinderConfig,
) -> Result<MatchedRows, FinderError> {
    // Validate both before hashing either
    super::finder::validate_roots(&[reference.to_path_buf(), candidate.to_path_buf()])?;

    let reference_table = list_all(reference, config, false)?;
    let candidate_table = list_all(candidate, config, false)?;

    let matches = compare_tables(&reference_table, &candidate_table);
    log::info!(
        "{} of {} files in {} already exist in {}",
        matches.len(),
        candidate_table.len(),
        candidate.display(),
        reference.display()
    );
    Ok(MatchedRows {
        table: matches,
        unreadable: reference_table.unreadable_count() + candidate_table.unreadable_count(),
    })
}

/// Paths of candidate files with a copy in the reference folder.
///
/// # Errors
///
/// See [`compare_folders`].
pub fn redundant_candidates(
    reference: &Path,
    candidate: &Path,
    config: &FinderConfig,
) -> Result<Vec<PathBuf>, FinderError> {
    compare_folders(reference, candidate, config).map(|found| found.table.paths())
}
