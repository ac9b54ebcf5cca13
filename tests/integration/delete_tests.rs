use dupefind::actions::{delete_duplicates, DeleteConfig, DeleteError};
use dupefind::duplicates::{duplicates_only, list_all, FinderConfig};
use dupefind::output::{read_file_column, write_table_to_path};
use std::fs;
use tempfile::tempdir;

use super::common::{names, write_file};

#[test]
fn test_delete_keeps_first_copy_of_each_content() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"alpha");
    let b = write_file(dir.path(), "b", b"beta");
    let a_copy = write_file(dir.path(), "a_copy", b"alpha");

    let report = delete_duplicates(
        &[a.clone(), b.clone(), a_copy.clone()],
        &DeleteConfig::default(),
        None,
    );

    assert!(report.all_succeeded());
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.deleted[0].survivor, a);
    assert_eq!(report.bytes_freed, 5);
    assert!(a.exists());
    assert!(b.exists());
    assert!(!a_copy.exists());
}

#[test]
fn test_delete_dry_run_removes_nothing() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"same");
    let b = write_file(dir.path(), "b", b"same");

    let report = delete_duplicates(
        &[a.clone(), b.clone()],
        &DeleteConfig::default().with_dry_run(true),
        None,
    );

    assert!(report.dry_run);
    assert_eq!(report.deleted_count(), 1);
    assert!(a.exists());
    assert!(b.exists());
    assert!(report.summary().starts_with("Would delete 1 file(s)"));
}

#[test]
fn test_delete_stale_list_never_removes_changed_content() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"v1");
    let b = write_file(dir.path(), "b", b"v1");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();
    let csv = dir.path().join("saved.csv");
    write_table_to_path(&duplicates_only(&table), &csv).unwrap();

    // b changes after the table was saved
    fs::write(&b, b"v2").unwrap();

    let paths = read_file_column(&csv).unwrap();
    let report = delete_duplicates(&paths, &DeleteConfig::default(), None);

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(report.retained.len(), 2);
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_delete_from_saved_table() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "one", b"x1");
    write_file(&root, "two", b"x1");
    write_file(&root, "three", b"x1");
    write_file(&root, "other", b"x2");

    let table = list_all(&root, &FinderConfig::default(), false).unwrap();
    let csv = dir.path().join("dups.csv");
    write_table_to_path(&duplicates_only(&table), &csv).unwrap();

    let paths = read_file_column(&csv).unwrap();
    assert_eq!(paths.len(), 3);

    let report = delete_duplicates(&paths, &DeleteConfig::default(), None);

    assert_eq!(report.deleted_count(), 2);
    let mut left: Vec<_> = fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    left.sort();
    // One file per content remains
    assert_eq!(left.len(), 2);
    assert!(names(&left).contains(&"other".to_string()));
}

#[test]
fn test_delete_path_listed_twice_is_kept() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"only");

    let report = delete_duplicates(&[a.clone(), a.clone()], &DeleteConfig::default(), None);

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(report.repeated, vec![a.clone()]);
    assert!(a.exists());
}

#[test]
fn test_delete_missing_file_is_recorded() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"here");
    let gone = dir.path().join("gone");

    let report = delete_duplicates(&[a.clone(), gone.clone()], &DeleteConfig::default(), None);

    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].0, gone);
    assert!(matches!(report.failures[0].1, DeleteError::UnreadableFile(_)));
    assert!(a.exists());
}

#[cfg(unix)]
#[test]
fn test_delete_symlink_to_survivor_is_not_deleted() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"target");
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&a, &link).unwrap();

    let report = delete_duplicates(&[a.clone(), link.clone()], &DeleteConfig::default(), None);

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(report.repeated, vec![link.clone()]);
    assert!(a.exists());
    assert!(link.exists());
}
