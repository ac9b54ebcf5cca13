use dupefind::duplicates::{
    duplicates_only, find_copies_of, list_all, FinderConfig, FinderError, RowKey,
};
use dupefind::scanner::Hasher;
use tempfile::tempdir;

use super::common::{names, write_file};

#[test]
fn test_list_all_hello_scenario() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"hello");
    write_file(dir.path(), "b", b"hello");
    let c = write_file(dir.path(), "c", b"world");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.class_count(), 1);

    let hello = Hasher::new().full_hash(&a).unwrap();
    let world = Hasher::new().full_hash(&c).unwrap();
    let keys: Vec<_> = table.iter().map(|r| r.key).collect();
    assert_eq!(keys.iter().filter(|k| **k == RowKey::Digest(hello)).count(), 2);
    assert_eq!(keys.iter().filter(|k| **k == RowKey::Digest(world)).count(), 1);

    let duplicates = duplicates_only(&table);
    assert_eq!(names(&duplicates.paths()), vec!["a", "b"]);
}

#[test]
fn test_list_all_hashes_unique_sizes_too() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "short", b"1");
    write_file(dir.path(), "longer", b"12345");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|r| r.key.digest().is_some()));
    assert!(duplicates_only(&table).is_empty());
}

#[test]
fn test_list_all_fast_scan_matches_full_duplicates() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"same");
    write_file(dir.path(), "b", b"same");
    write_file(dir.path(), "c", b"diff");
    write_file(dir.path(), "d", b"unique length");

    let full = list_all(dir.path(), &FinderConfig::default(), false).unwrap();
    let fast = list_all(dir.path(), &FinderConfig::default(), true).unwrap();

    assert_eq!(full.len(), 4);
    assert_eq!(fast.len(), 3);
    assert_eq!(duplicates_only(&full), duplicates_only(&fast));
}

#[test]
fn test_list_all_empty_folder() {
    let dir = tempdir().unwrap();
    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();
    assert!(table.is_empty());
    assert!(duplicates_only(&table).is_empty());
}

#[test]
fn test_list_all_is_deterministic() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write_file(dir.path(), &format!("d{}/f{}", i % 4, i), format!("{}", i % 5).as_bytes());
    }

    let first = list_all(dir.path(), &FinderConfig::default(), false).unwrap();
    let second = list_all(dir.path(), &FinderConfig::default().with_io_threads(1), false).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_find_copies_of_file_inside_folder() {
    let dir = tempdir().unwrap();
    let wanted = write_file(dir.path(), "source.bin", b"needle");
    write_file(dir.path(), "folder/a.bin", b"needle");
    write_file(dir.path(), "folder/b.bin", b"needle");
    write_file(dir.path(), "folder/c.bin", b"hay");

    let copies = find_copies_of(&wanted, &dir.path().join("folder"), &FinderConfig::default())
        .unwrap();

    assert_eq!(names(&copies.table.paths()), vec!["a.bin", "b.bin"]);
}

#[test]
fn test_find_copies_of_single_copy_is_not_reported() {
    let dir = tempdir().unwrap();
    let wanted = write_file(dir.path(), "source.bin", b"needle");
    write_file(dir.path(), "folder/only.bin", b"needle");

    let copies = find_copies_of(&wanted, &dir.path().join("folder"), &FinderConfig::default())
        .unwrap();

    // Only classes of two or more files inside the folder are matched
    assert!(copies.table.is_empty());
}

#[test]
fn test_find_copies_of_missing_inputs() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "f", b"x");

    assert!(matches!(
        find_copies_of(&dir.path().join("nope"), dir.path(), &FinderConfig::default()),
        Err(FinderError::InputNotFound(_))
    ));
    assert!(matches!(
        find_copies_of(&file, &dir.path().join("nope"), &FinderConfig::default()),
        Err(FinderError::InputNotFound(_))
    ));
}
