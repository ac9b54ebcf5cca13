//! JSON output formatters.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Table Schema
//!
//! ```json
//! {
//!   "rows": [
//!     { "file": "/path/to/file1.txt", "hash": "abc123..." },
//!     { "file": "/path/to/file2.txt", "hash": "abc123..." }
//!   ],
//!   "classes": 1
//! }
//! ```
//!
//! # Multi-root Scan Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "hash": "abc123...", "size": 1024, "files": ["/a", "/b"] }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 5,
//!     "exit_code": 0,
//!     "exit_code_name": "DF000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{EquivalenceClass, ResultTable, ScanSummary};
use crate::error::ExitCode;

/// One table row in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRow {
    /// Path to the file
    pub file: String,
    /// Hex digest or unreadable marker
    pub hash: String,
}

/// A result table in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonTable {
    /// Rows in table order
    pub rows: Vec<JsonRow>,
    /// Number of digests shared by two or more rows
    pub classes: usize,
}

impl JsonTable {
    /// Convert a result table.
    #[must_use]
    pub fn new(table: &ResultTable) -> Self {
        Self {
            rows: table
                .iter()
                .map(|row| JsonRow {
                    file: super::path_text(&row.path),
                    hash: row.key.to_string(),
                })
                .collect(),
            classes: table.class_count(),
        }
    }
}

/// A single equivalence class in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Paths of all members, representative first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from an equivalence class.
    #[must_use]
    pub fn from_class(class: &EquivalenceClass) -> Self {
        Self {
            hash: class.digest_hex(),
            size: class.size,
            files: class
                .files
                .iter()
                .map(|f| super::path_text(&f.path))
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Files left after size grouping
    pub size_candidates: usize,
    /// Files left after partial hashing
    pub partial_candidates: usize,
    /// Files in a confirmed class
    pub confirmed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding representatives)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Files that could not be read
    pub skipped_files: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            size_candidates: summary.size_candidates,
            partial_candidates: summary.partial_candidates,
            confirmed_files: summary.confirmed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            skipped_files: summary.skipped_files(),
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output of a multi-root scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from classes, summary and exit code.
    #[must_use]
    pub fn new(classes: &[EquivalenceClass], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: classes.iter().map(JsonDuplicateGroup::from_class).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }
}

/// Write any serializable value as JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize, W: Write>(
    value: &T,
    writer: &mut W,
    pretty: bool,
) -> Result<(), JsonOutputError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
