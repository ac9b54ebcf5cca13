//! Command-line interface definitions for dupefind.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, progress) and
//! subcommands for different operations.
//!
//! # Example
//!
//! ```bash
//! # List duplicates under one folder
//! dupefind scan ~/Downloads
//!
//! # Save the exhaustive table as CSV
//! dupefind scan ~/Downloads --all --csv-path ./reports --csv-filename downloads
//!
//! # Files in ~/Inbox that already exist in ~/Archive
//! dupefind compare ~/Archive ~/Inbox --output json
//!
//! # Remove redundant copies listed in a saved table
//! dupefind delete ./reports/downloads.csv --dry-run
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Content-based duplicate file finder.
///
/// dupefind groups files by content (BLAKE3), lists or compares them, and
/// removes redundant copies after re-hashing every file it touches.
#[derive(Debug, Parser)]
#[command(name = "dupefind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Disable progress bars
    #[arg(long, global = true, env = "DUPEFIND_NO_PROGRESS")]
    pub no_progress: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupefind.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find duplicate files under one or more folders
    Scan(ScanArgs),
    /// List files of a candidate folder that already exist in a reference folder
    Compare(CompareArgs),
    /// Find copies of one file inside a folder
    Find(FindArgs),
    /// Print a table saved as CSV
    List(ListArgs),
    /// Delete redundant copies among the files listed in a CSV table
    Delete(DeleteArgs),
}

/// Options shared by every command that hashes files.
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Only consider files with this extension (e.g. txt or .txt)
    #[arg(short, long = "ext", value_name = "EXT")]
    pub extension: Option<String>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,
}

/// Where and how results are written.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format on stdout
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Directory to save the result table in (created if missing)
    #[arg(long, value_name = "DIR")]
    pub csv_path: Option<PathBuf>,

    /// File name of the saved table (".csv" is appended when missing)
    #[arg(long, value_name = "NAME")]
    pub csv_filename: Option<String>,
}

impl OutputArgs {
    /// Whether the table should also be saved as CSV.
    #[must_use]
    pub fn saves_csv(&self) -> bool {
        self.csv_path.is_some() || self.csv_filename.is_some()
    }
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Folders to scan; with several, duplicates are found across all of them
    #[arg(value_name = "FOLDER", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Only hash files that share their size with another file
    #[arg(long)]
    pub fast_scan: bool,

    /// List every file with its hash, not only duplicates
    #[arg(short, long)]
    pub all: bool,

    #[command(flatten)]
    pub hash: HashArgs,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Folder whose files are kept as the originals
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Folder searched for copies of reference files
    #[arg(value_name = "CANDIDATE")]
    pub candidate: PathBuf,

    #[command(flatten)]
    pub hash: HashArgs,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the find subcommand.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// File whose copies are searched for
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Folder to search
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    #[command(flatten)]
    pub hash: HashArgs,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the list subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// CSV table written by scan, compare or find
    #[arg(value_name = "CSV_FILE")]
    pub csv_file: PathBuf,

    /// Output format on stdout
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// CSV file with a "file" column; earlier files are kept
    #[arg(value_name = "CSV_FILE")]
    pub csv_file: PathBuf,

    /// Show what would be deleted without removing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Number of I/O threads for re-hashing (default: 4)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Table,
    /// JSON output for scripting
    Json,
    /// CSV output with file,hash columns
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
