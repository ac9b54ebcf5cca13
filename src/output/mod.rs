//! Output formatters for tables and scan results.
//!
//! This module provides different output formats:
//! - CSV with `file,hash` columns, readable back by `list` and `delete`
//! - JSON for automation and scripting
//! - Plain text for the terminal
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::{duplicates_only, list_all, FinderConfig};
//! use dupefind::output::json::{write_json, JsonTable};
//! use std::path::Path;
//!
//! let table = list_all(Path::new("."), &FinderConfig::default(), false).unwrap();
//! write_json(&JsonTable::new(&duplicates_only(&table)), &mut std::io::stdout(), true).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::path::Path;

// Re-export main types
pub use csv::{
    read_file_column, read_table, resolve_csv_path, write_table, write_table_to_path, CsvError,
    DEFAULT_CSV_FILENAME,
};
pub use json::{write_json, JsonOutput, JsonTable};
pub use text::{write_classes, write_table_text};

/// Render a path for a saved or machine-readable table.
///
/// Paths that are not valid UTF-8 are converted lossily and logged, since the
/// written path will not resolve back to the original file.
pub(crate) fn path_text(path: &Path) -> String {
    match path.to_str() {
        Some(text) => text.to_string(),
        None => {
            let lossy = path.to_string_lossy().into_owned();
            log::warn!("Path is not valid UTF-8, written as {}", lossy);
            lossy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_text_keeps_utf8() {
        assert_eq!(path_text(Path::new("/data/é.txt")), "/data/é.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_text_replaces_invalid_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/data/bad\xff.txt"));
        assert_eq!(path_text(path), "/data/bad\u{FFFD}.txt");
    }
}
