use dupefind::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupefind::scanner::WalkerConfig;
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

use super::common::{names, write_file};

fn class_names(class: &dupefind::duplicates::EquivalenceClass) -> Vec<String> {
    names(&class.paths())
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (classes, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(classes.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"content a");
    write_file(dir.path(), "b.txt", b"content bb");
    write_file(dir.path(), "c.txt", b"content c");

    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(classes.is_empty());
    assert_eq!(summary.total_files, 3);
    // b.txt is the only file of its size
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.eliminated_by_partial, 2);
}

#[test]
fn test_scan_hello_scenario() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"hello");
    write_file(dir.path(), "c.txt", b"world!");

    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(class_names(&classes[0]), vec!["a.txt", "b.txt"]);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_scan_difference_in_last_byte_of_long_files() {
    let dir = tempdir().unwrap();
    let mut one = vec![b'x'; 1025];
    let mut two = one.clone();
    one[1024] = b'1';
    two[1024] = b'2';
    write_file(dir.path(), "one", &one);
    write_file(dir.path(), "two", &two);

    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // Same first KiB, so both reach the full hash and split there
    assert!(classes.is_empty());
    assert_eq!(summary.partial_candidates, 2);
    assert_eq!(summary.confirmed_files, 0);
}

#[test]
fn test_scan_difference_inside_first_kib() {
    let dir = tempdir().unwrap();
    let mut one = vec![b'x'; 1024];
    let mut two = one.clone();
    one[1023] = b'1';
    two[1023] = b'2';
    write_file(dir.path(), "one", &one);
    write_file(dir.path(), "two", &two);

    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(classes.is_empty());
    assert_eq!(summary.size_candidates, 2);
    assert_eq!(summary.partial_candidates, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"same bytes");
    write_file(dir.path(), "sub/deeper/b.txt", b"same bytes");

    let (classes, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(class_names(&classes[0]), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_scan_across_roots_keeps_root_order() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write_file(second.path(), "z_original", b"shared");
    write_file(first.path(), "a_copy", b"shared");

    let roots = vec![second.path().to_path_buf(), first.path().to_path_buf()];
    let (classes, _) = DuplicateFinder::with_defaults()
        .find_in_paths(&roots)
        .unwrap();

    assert_eq!(classes.len(), 1);
    // The first root wins even though its file sorts later by name
    assert_eq!(class_names(&classes[0]), vec!["z_original", "a_copy"]);
}

#[test]
fn test_scan_overlapping_roots_count_files_once() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"twin");
    write_file(dir.path(), "sub/b", b"twin");

    let roots = vec![dir.path().to_path_buf(), dir.path().join("sub")];
    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_in_paths(&roots)
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].len(), 2);
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.aliased_paths, 1);
}

#[test]
fn test_scan_extension_filter() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"data");
    write_file(dir.path(), "b.txt", b"data");
    write_file(dir.path(), "c.log", b"data");

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_extension(Some("txt".to_string())));
    let (classes, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(class_names(&classes[0]), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_scan_interrupted_before_start() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"x");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.find_duplicates(dir.path()),
        Err(FinderError::Interrupted)
    ));
}

#[test]
fn test_scan_missing_root() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults().find_duplicates(&dir.path().join("gone"));
    assert!(matches!(result, Err(FinderError::InputNotFound(_))));
}

#[test]
fn test_scan_file_as_root() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "plain", b"x");
    let result = DuplicateFinder::with_defaults().find_duplicates(&file);
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_scan_single_thread_matches_default() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        write_file(dir.path(), &format!("f{:02}", i), format!("{}", i % 3).as_bytes());
    }

    let (parallel, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let (serial, _) = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap();

    let parallel: Vec<_> = parallel.iter().map(|c| c.paths()).collect();
    let serial: Vec<_> = serial.iter().map(|c| c.paths()).collect();
    assert_eq!(parallel, serial);
    assert_eq!(parallel.len(), 3);
}

#[test]
fn test_scan_repeated_runs_share_no_state() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"again");
    write_file(dir.path(), "b", b"again");

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    fs::remove_file(dir.path().join("b")).unwrap();
    let (second, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(summary.aliased_paths, 0);
}
