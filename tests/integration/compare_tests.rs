use dupefind::duplicates::{compare_folders, redundant_candidates, FinderConfig, FinderError};
use tempfile::tempdir;

use super::common::{names, write_file};

#[test]
fn test_compare_reports_candidate_copies() {
    let reference = tempdir().unwrap();
    let candidate = tempdir().unwrap();
    write_file(reference.path(), "photo.jpg", b"jpeg bytes");
    write_file(reference.path(), "notes.txt", b"notes");
    write_file(candidate.path(), "copy_of_photo.jpg", b"jpeg bytes");
    write_file(candidate.path(), "new.txt", b"brand new");

    let matches =
        compare_folders(reference.path(), candidate.path(), &FinderConfig::default()).unwrap();

    assert_eq!(names(&matches.table.paths()), vec!["copy_of_photo.jpg"]);
    assert_eq!(matches.unreadable, 0);
}

#[test]
fn test_compare_lists_each_candidate_once() {
    let reference = tempdir().unwrap();
    let candidate = tempdir().unwrap();
    write_file(reference.path(), "r1", b"dup");
    write_file(reference.path(), "r2", b"dup");
    write_file(reference.path(), "r3", b"dup");
    write_file(candidate.path(), "c1", b"dup");
    write_file(candidate.path(), "c2", b"dup");

    let matches =
        compare_folders(reference.path(), candidate.path(), &FinderConfig::default()).unwrap();

    assert_eq!(names(&matches.table.paths()), vec!["c1", "c2"]);
}

#[test]
fn test_compare_disjoint_folders() {
    let reference = tempdir().unwrap();
    let candidate = tempdir().unwrap();
    write_file(reference.path(), "a", b"left");
    write_file(candidate.path(), "b", b"right");

    let paths =
        redundant_candidates(reference.path(), candidate.path(), &FinderConfig::default()).unwrap();

    assert!(paths.is_empty());
}

#[test]
fn test_compare_missing_candidate_fails_before_hashing() {
    let reference = tempdir().unwrap();
    write_file(reference.path(), "a", b"left");

    let result = compare_folders(
        reference.path(),
        &reference.path().join("missing"),
        &FinderConfig::default(),
    );

    assert!(matches!(result, Err(FinderError::InputNotFound(_))));
}
