//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Partial hash comparison (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Exhaustive digest tables and cross-folder comparison

pub mod compare;
pub mod finder;
pub mod groups;
pub mod table;

pub use compare::{compare_folders, compare_tables, redundant_candidates};
pub use finder::{
    phase2_partial, phase3_full, validate_roots, DuplicateFinder, FinderConfig, FinderError,
    FullStats, PartialStats, ScanContext, ScanSummary, StageConfig,
};
pub use groups::{
    group_by_size, sort_by_ordinal, EquivalenceClass, GroupingStats, PartialGroups, PartialKey,
    SizeGroups,
};
pub use table::{
    duplicates_only, find_copies_of, list_all, preselect, InvalidRowKey, MatchedRows, ResultTable,
    RowKey, TableRow, UNREADABLE_MARKER,
};
