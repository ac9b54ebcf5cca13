use dupefind::duplicates::{duplicates_only, list_all, FinderConfig};
use dupefind::output::{
    read_file_column, read_table, resolve_csv_path, write_json, write_table_to_path, CsvError,
    JsonTable,
};
use std::fs;
use tempfile::tempdir;

use super::common::write_file;

#[test]
fn test_saved_table_reads_back_identically() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "a", b"same");
    write_file(&root, "b", b"same");
    write_file(&root, "c", b"other");

    let table = list_all(&root, &FinderConfig::default(), false).unwrap();
    let target = resolve_csv_path(&dir.path().join("reports"), "all").unwrap();
    write_table_to_path(&table, &target).unwrap();

    assert!(target.ends_with("reports/all.csv"));
    assert_eq!(read_table(&target).unwrap(), table);
}

#[test]
fn test_saved_table_has_file_and_hash_header() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "only", b"x");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();
    let target = dir.path().join("out.csv");
    write_table_to_path(&duplicates_only(&table), &target).unwrap();

    let content = fs::read_to_string(&target).unwrap();
    assert_eq!(content.lines().next(), Some("file,hash"));
    assert!(read_file_column(&target).unwrap().is_empty());
}

#[test]
fn test_file_column_read_from_foreign_csv() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("hand.csv");
    fs::write(&csv, "size,file,note\n1,/x/one,first\n2,/x/two\n").unwrap();

    let files = read_file_column(&csv).unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[1], std::path::PathBuf::from("/x/two"));
}

#[test]
fn test_csv_without_file_column_is_rejected() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bad.csv");
    fs::write(&csv, "path,hash\n/a,00\n").unwrap();

    assert!(matches!(
        read_file_column(&csv),
        Err(CsvError::MissingFileColumn(_))
    ));
}

#[test]
fn test_table_json_lists_rows_and_classes() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"json");
    write_file(dir.path(), "b", b"json");

    let table = list_all(dir.path(), &FinderConfig::default(), false).unwrap();
    let mut out = Vec::new();
    write_json(&JsonTable::new(&table), &mut out, false).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["classes"], 1);
    assert_eq!(value["rows"].as_array().unwrap().len(), 2);
    assert_eq!(value["rows"][0]["hash"], value["rows"][1]["hash"]);
}
