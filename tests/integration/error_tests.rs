use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use mediadupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use mediadupe::scanner::{FileRecord, MediaCategory};
use tempfile::TempDir;

use super::fixtures::{write_file, write_png};

#[test]
fn test_nonexistent_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");

    match DuplicateFinder::with_defaults().find_duplicates(&missing) {
        Err(FinderError::PathNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected PathNotFound, got {:?}", other.map(|(r, _)| r.len())),
    }
}

#[test]
fn test_file_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let file = write_file(dir.path(), "plain.txt", b"x");

    match DuplicateFinder::with_defaults().find_duplicates(&file) {
        Err(FinderError::NotADirectory(path)) => assert_eq!(path, file),
        other => panic!("Expected NotADirectory, got {:?}", other.map(|(r, _)| r.len())),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read anyway
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(&locked);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(result, Err(FinderError::PermissionDenied(_))));
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_reported_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"dup");
    write_file(dir.path(), "b.txt", b"dup");
    let locked = dir.path().join("locked");
    write_file(&locked, "hidden.txt", b"dup");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.groups()[0].len(), 2);
    assert!(!summary.walk_errors.is_empty());
    assert!(summary.has_problems());
}

#[test]
fn test_shutdown_before_scan_interrupts() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"dup");
    write_file(dir.path(), "b.txt", b"dup");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.find_duplicates(dir.path()),
        Err(FinderError::Interrupted)
    ));
}

#[test]
fn test_failures_do_not_hide_other_duplicates() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "bad1.png", b"garbage");
    write_file(dir.path(), "bad2.png", b"garbage");
    write_png(&dir.path().join("good1.png"), 200);
    write_png(&dir.path().join("good2.png"), 200);
    write_file(dir.path(), "notes1.md", b"# same");
    write_file(dir.path(), "notes2.md", b"# same");

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // Undecodable files never share a group, even with identical bytes
    assert_eq!(result.len(), 2);
    assert_eq!(summary.skipped.len(), 2);
    assert!(summary
        .skipped
        .iter()
        .all(|s| s.category == MediaCategory::Image && !s.reason.is_empty()));
}

#[test]
fn test_vanished_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let kept = write_file(dir.path(), "kept.txt", b"abc");
    let copy = write_file(dir.path(), "copy.txt", b"abc");
    let gone = dir.path().join("gone.txt");

    let files = vec![
        FileRecord::classified(kept.clone(), 3),
        FileRecord::classified(gone.clone(), 3),
        FileRecord::classified(copy.clone(), 3),
    ];
    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(result.groups()[0].paths(), vec![kept, copy]);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, gone);
}
