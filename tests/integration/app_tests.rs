use clap::Parser;
use dupefind::cli::Cli;
use dupefind::error::ExitCode;
use dupefind::output::read_file_column;
use dupefind::run_app;
use tempfile::tempdir;

use super::common::write_file;

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["dupefind", "--quiet", "--no-progress"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap()).unwrap()
}

#[test]
fn test_scan_saves_csv_and_reports_duplicates() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write_file(&data, "a", b"hello");
    write_file(&data, "b", b"hello");
    write_file(&data, "c", b"world");
    let reports = dir.path().join("reports");

    let code = run(&[
        "scan",
        data.to_str().unwrap(),
        "--csv-path",
        reports.to_str().unwrap(),
        "--csv-filename",
        "found",
        "--output",
        "csv",
    ]);

    assert_eq!(code, ExitCode::Success);
    let saved = read_file_column(&reports.join("found.csv")).unwrap();
    assert_eq!(saved.len(), 2);
}

#[test]
fn test_scan_without_duplicates_exits_with_two() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"one");
    write_file(dir.path(), "b", b"two!");

    let code = run(&["scan", dir.path().to_str().unwrap(), "--output", "json"]);

    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_several_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write_file(first.path(), "a", b"shared");
    write_file(second.path(), "b", b"shared");

    let code = run(&[
        "scan",
        first.path().to_str().unwrap(),
        second.path().to_str().unwrap(),
    ]);

    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let cli = Cli::try_parse_from([
        "dupefind",
        "--quiet",
        "--no-progress",
        "scan",
        missing.to_str().unwrap(),
    ])
    .unwrap();

    assert!(run_app(cli).is_err());
}

#[test]
fn test_scan_then_delete_with_yes() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let a = write_file(&data, "a", b"copy");
    let b = write_file(&data, "b", b"copy");

    run(&[
        "scan",
        data.to_str().unwrap(),
        "--csv-path",
        dir.path().to_str().unwrap(),
    ]);
    let csv = dir.path().join("duplicates.csv");

    let dry = run(&["delete", csv.to_str().unwrap(), "--dry-run"]);
    assert_eq!(dry, ExitCode::Success);
    assert!(b.exists());

    let code = run(&["delete", csv.to_str().unwrap(), "--yes"]);
    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());

    // Nothing left to delete on a second pass
    let again = run(&["delete", csv.to_str().unwrap(), "--yes"]);
    assert_eq!(again, ExitCode::PartialSuccess);
}

#[test]
fn test_compare_and_list() {
    let dir = tempdir().unwrap();
    let reference = dir.path().join("ref");
    let candidate = dir.path().join("cand");
    write_file(&reference, "orig", b"content");
    write_file(&candidate, "copy", b"content");
    write_file(&candidate, "fresh", b"new content");

    let code = run(&[
        "compare",
        reference.to_str().unwrap(),
        candidate.to_str().unwrap(),
        "--csv-path",
        dir.path().to_str().unwrap(),
        "--csv-filename",
        "redundant.csv",
    ]);
    assert_eq!(code, ExitCode::Success);

    let csv = dir.path().join("redundant.csv");
    assert_eq!(read_file_column(&csv).unwrap().len(), 1);

    // A single matching row holds no class of its own
    let listed = run(&["list", csv.to_str().unwrap()]);
    assert_eq!(listed, ExitCode::NoDuplicates);
}

#[test]
fn test_find_reports_copies() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "needle", b"find me");
    let folder = dir.path().join("hay");
    write_file(&folder, "x", b"find me");
    write_file(&folder, "y", b"find me");

    let code = run(&[
        "find",
        file.to_str().unwrap(),
        folder.to_str().unwrap(),
        "--output",
        "json",
    ]);

    assert_eq!(code, ExitCode::Success);
}

#[cfg(unix)]
#[test]
fn test_broken_link_is_partial_success_for_one_or_many_roots() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write_file(&data, "a", b"hello");
    write_file(&data, "b", b"hello");
    std::os::unix::fs::symlink(data.join("gone"), data.join("broken")).unwrap();
    let other = dir.path().join("other");
    write_file(&other, "c", b"world!");

    let single = run(&["scan", data.to_str().unwrap()]);
    let many = run(&["scan", data.to_str().unwrap(), other.to_str().unwrap()]);

    assert_eq!(single, ExitCode::PartialSuccess);
    assert_eq!(many, single);
}

#[cfg(unix)]
#[test]
fn test_find_and_compare_count_broken_links() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "needle", b"find me");
    let folder = dir.path().join("hay");
    write_file(&folder, "x", b"find me");
    write_file(&folder, "y", b"find me");
    std::os::unix::fs::symlink(folder.join("gone"), folder.join("broken")).unwrap();
    let reference = dir.path().join("ref");
    write_file(&reference, "orig", b"find me");

    let found = run(&["find", file.to_str().unwrap(), folder.to_str().unwrap()]);
    let compared = run(&[
        "compare",
        reference.to_str().unwrap(),
        folder.to_str().unwrap(),
    ]);

    assert_eq!(found, ExitCode::PartialSuccess);
    assert_eq!(compared, ExitCode::PartialSuccess);
}

#[test]
fn test_scan_rejects_table_flags_with_several_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write_file(first.path(), "a", b"shared");
    write_file(second.path(), "b", b"shared");

    for flag in ["--all", "--fast-scan"] {
        let cli = Cli::try_parse_from([
            "dupefind",
            "--quiet",
            "--no-progress",
            "scan",
            first.path().to_str().unwrap(),
            second.path().to_str().unwrap(),
            flag,
        ])
        .unwrap();

        let err = run_app(cli).unwrap_err();
        assert!(err.to_string().contains("single folder"), "{}", err);
    }
}
