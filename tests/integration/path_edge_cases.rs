use dupefind::duplicates::{duplicates_only, list_all, DuplicateFinder, FinderConfig};
use tempfile::tempdir;

use super::common::{names, write_file};

#[test]
fn test_empty_files_form_a_class() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].size, 0);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_ds_store_is_skipped() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), ".DS_Store", b"finder");
    write_file(dir.path(), "sub/.DS_Store", b"finder");
    write_file(dir.path(), "real", b"kept");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();

    assert_eq!(names(&table.paths()), vec!["real"]);
}

#[test]
fn test_hidden_files_are_scanned() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), ".hidden", b"secret");
    write_file(dir.path(), "visible", b"secret");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();

    assert_eq!(duplicates_only(&table).len(), 2);
}

#[test]
fn test_unicode_file_names() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "café.txt", b"unicode");
    write_file(dir.path(), "日本語.txt", b"unicode");

    let (classes, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_file_symlink_is_not_its_own_duplicate() {
    let dir = tempdir().unwrap();
    let target = write_file(dir.path(), "a_target", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("b_link")).unwrap();

    let (classes, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(classes.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.aliased_paths, 1);
}

#[cfg(unix)]
#[test]
fn test_directory_symlink_is_not_descended() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "real/file", b"once");
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();

    assert_eq!(table.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_hard_links_count_as_duplicates() {
    let dir = tempdir().unwrap();
    let original = write_file(dir.path(), "original", b"hard");
    std::fs::hard_link(&original, dir.path().join("second")).unwrap();

    let (classes, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // Distinct paths with identical content, even when they share storage
    assert_eq!(classes.len(), 1);
}
