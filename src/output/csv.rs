//! CSV persistence for result tables.
//!
//! One row is written for each [`TableRow`].
//!
//! # Columns
//!
//! - `file`: Path to the file
//! - `hash`: BLAKE3 content hash (hexadecimal), or the unreadable marker
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::{duplicates_only, list_all, FinderConfig};
//! use dupefind::output::csv::{resolve_csv_path, write_table_to_path};
//! use std::path::Path;
//!
//! let table = list_all(Path::new("."), &FinderConfig::default(), false).unwrap();
//! let target = resolve_csv_path(Path::new("./reports"), "duplicates").unwrap();
//! write_table_to_path(&duplicates_only(&table), &target).unwrap();
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::{InvalidRowKey, ResultTable, RowKey, TableRow};

/// Default file name for saved tables.
pub const DEFAULT_CSV_FILENAME: &str = "duplicates.csv";

/// Errors that can occur while reading or writing CSV tables.
#[derive(Debug, Error)]
pub enum CsvError {
    /// I/O error during reading or writing.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error during CSV (de)serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header has no `file` column.
    #[error("{0} has no 'file' column")]
    MissingFileColumn(PathBuf),

    /// A `hash` cell holds neither a digest nor the unreadable marker.
    #[error("{path}, line {line}: {source}")]
    InvalidHash {
        path: PathBuf,
        line: u64,
        #[source]
        source: InvalidRowKey,
    },
}

/// A single row in the CSV output.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    /// Path to the file
    file: String,
    /// Hex digest or unreadable marker
    hash: String,
}

impl From<&TableRow> for CsvRow {
    fn from(row: &TableRow) -> Self {
        Self {
            file: super::path_text(&row.path),
            hash: row.key.to_string(),
        }
    }
}

/// Write a table as CSV to the given writer.
///
/// # Errors
///
/// Returns `csv::Error` if writing or serialization fails.
pub fn write_table<W: io::Write>(table: &ResultTable, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if table.is_empty() {
        // Serializing zero rows would leave the header out
        csv_writer.write_record(["file", "hash"])?;
    }
    for row in table {
        csv_writer.serialize(CsvRow::from(row))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Generate CSV output as a string.
///
/// # Errors
///
/// Returns `csv::Error` if serialization fails.
pub fn table_to_string(table: &ResultTable) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

/// Write a table to a file, creating or truncating it.
///
/// # Errors
///
/// Returns [`CsvError`] if the file cannot be created or written.
pub fn write_table_to_path(table: &ResultTable, path: &Path) -> Result<(), CsvError> {
    let file = fs::File::create(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(table, io::BufWriter::new(file))?;
    log::info!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Read a table previously written by [`write_table`].
///
/// # Errors
///
/// Returns [`CsvError`] if the file cannot be read, lacks a column, or holds
/// an invalid hash.
pub fn read_table(path: &Path) -> Result<ResultTable, CsvError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "file") {
        return Err(CsvError::MissingFileColumn(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        let record = record?;
        let key = record
            .hash
            .parse::<RowKey>()
            .map_err(|source| CsvError::InvalidHash {
                path: path.to_path_buf(),
                line: rows.len() as u64 + 2,
                source,
            })?;
        rows.push(TableRow::new(PathBuf::from(record.file), key));
    }

    Ok(ResultTable::new(rows))
}

/// Read the ordered `file` column of a CSV file.
///
/// Other columns are ignored, so any CSV with a `file` header works.
///
/// # Errors
///
/// Returns [`CsvError::MissingFileColumn`] if the header lacks `file`.
pub fn read_file_column(path: &Path) -> Result<Vec<PathBuf>, CsvError> {
    let mut reader = open_reader(path)?;
    let index = reader
        .headers()?
        .iter()
        .position(|h| h == "file")
        .ok_or_else(|| CsvError::MissingFileColumn(path.to_path_buf()))?;

    let mut files = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(cell) = record.get(index).filter(|c| !c.is_empty()) {
            files.push(PathBuf::from(cell));
        }
    }
    Ok(files)
}

fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>, CsvError> {
    let file = fs::File::open(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Build the path a table is saved to.
///
/// The directory is created if missing and `.csv` is appended to a file name
/// without that extension.
///
/// # Errors
///
/// Returns [`CsvError::Io`] if the directory cannot be created.
pub fn resolve_csv_path(directory: &Path, filename: &str) -> Result<PathBuf, CsvError> {
    if !directory.as_os_str().is_empty() && !directory.exists() {
        fs::create_dir_all(directory).map_err(|source| CsvError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        log::debug!("Created output directory {}", directory.display());
    }

    let mut name = filename.to_string();
    if !name.to_ascii_lowercase().ends_with(".csv") {
        name.push_str(".csv");
    }
    Ok(directory.join(name))
}
