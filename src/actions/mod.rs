//! File actions module.
//!
//! # Deletion
//!
//! The delete module removes redundant copies from an ordered path list:
//! - Every path is re-hashed before any decision
//! - The first path with each content survives
//! - Files changed since hashing are skipped
//! - Dry-run mode reports without removing anything
//!
//! ```no_run
//! use dupefind::actions::delete::{delete_duplicates, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/a.txt"), PathBuf::from("/a_copy.txt")];
//! let report = delete_duplicates(&paths, &DeleteConfig::default(), None);
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_duplicates, plan_deletions, remove_file, Action, DeleteConfig, DeleteError,
    DeleteProgressCallback, DeletedFile, DeletionReport, FileSnapshot,
};
