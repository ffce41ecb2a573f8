use anyhow::Context;
use clap::Parser;
use mediadupe::cli::Cli;
use mediadupe::duplicates::FinderError;
use mediadupe::error::{ExitCode, StructuredError};
use tempfile::TempDir;

use super::fixtures::write_file;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["mediadupe", "--quiet"];
    argv.extend_from_slice(args);
    mediadupe::run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_app_duplicates_found() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"hello");

    let code = run(&["scan", dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_app_no_duplicates() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"world");

    let code = run(&["scan", "--output", "json", dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_app_skipped_files_mean_partial_success() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"hello");
    write_file(dir.path(), "broken.png", b"not a png");

    let code = run(&["scan", dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::PartialSuccess);
    assert_eq!(code.as_i32(), 3);
}

#[test]
fn test_app_missing_root_is_general_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let err = run(&["scan", missing.to_str().unwrap()]).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);

    let structured = StructuredError::new(&err, ExitCode::from_error(&err));
    assert_eq!(structured.code, "MD001");
    assert!(structured.message.contains("Path not found"));
    assert!(!structured.interrupted);
}

#[test]
fn test_app_missing_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.toml");

    let err = run(&[
        "scan",
        "--config",
        config.to_str().unwrap(),
        dir.path().to_str().unwrap(),
    ])
    .unwrap_err();
    assert!(format!("{:#}", err).contains("Config file not found"));
}

#[test]
fn test_app_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"hello");
    write_file(dir.path(), "broken.png", b"not a png");
    let config = write_file(dir.path(), "conf/mediadupe.toml", b"ignore_patterns = [\"*.png\"]\n");

    let code = run(&[
        "scan",
        "-c",
        config.to_str().unwrap(),
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    // The broken image is ignored, so nothing is skipped
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_interrupt_maps_through_context() {
    let err = Err::<(), _>(FinderError::Interrupted)
        .context("Scan of /tmp failed")
        .unwrap_err();

    let code = ExitCode::from_error(&err);
    assert_eq!(code, ExitCode::Interrupted);
    assert_eq!(code.as_i32(), 130);
    assert!(StructuredError::new(&err, code).interrupted);
}
