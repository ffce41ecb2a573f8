use mediadupe::duplicates::{DuplicateFinder, FinderConfig};
use mediadupe::fingerprint::{DigestAlgorithm, Fingerprint};
use mediadupe::scanner::{MediaCategory, WalkerConfig};
use tempfile::TempDir;

use super::fixtures::write_file;

#[test]
fn test_scan_finds_identical_text_files() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"hello");
    write_file(dir.path(), "b.txt", b"hello");
    write_file(dir.path(), "c.txt", b"world");

    let finder = DuplicateFinder::with_defaults();
    let (result, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.len(), 1);
    let group = &result.groups()[0];
    assert_eq!(group.category(), MediaCategory::Generic);
    assert_eq!(
        group.paths(),
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
    );

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.fingerprinted.generic, 3);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
    assert!(summary.skipped.is_empty());
}

#[test]
fn test_scan_empty_directory() {
    let dir = TempDir::new().unwrap();

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.total_files, 0);
    assert!(!summary.has_problems());
}

#[test]
fn test_scan_unique_files_only() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write_file(dir.path(), &format!("file{i}.dat"), format!("content {i}").as_bytes());
    }

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.duplicate_files, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"same");
    write_file(dir.path(), "deep/er/still/b.txt", b"same");
    write_file(dir.path(), "sub/c.txt", b"same");

    let (result, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.groups()[0].paths(),
        vec![
            dir.path().join("a.txt"),
            dir.path().join("deep/er/still/b.txt"),
            dir.path().join("sub/c.txt"),
        ]
    );
}

#[test]
fn test_scan_groups_in_walk_order() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a1.txt", b"first");
    write_file(dir.path(), "b1.txt", b"second");
    write_file(dir.path(), "b2.txt", b"second");
    write_file(dir.path(), "c1.txt", b"first");

    let (result, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.groups()[0].files[0].path, dir.path().join("a1.txt"));
    assert_eq!(result.groups()[1].files[0].path, dir.path().join("b1.txt"));
}

#[test]
fn test_scan_is_repeatable() {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        write_file(dir.path(), &format!("d{}/f{i}.bin", i % 3), &[(i % 4) as u8; 64]);
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(8));
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "empty1.log", b"");
    write_file(dir.path(), "empty2.log", b"");

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.groups()[0].len(), 2);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_includes_hidden_files() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".hidden", b"secret");
    write_file(dir.path(), "visible", b"secret");

    let (result, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.groups()[0].len(), 2);
}

#[test]
fn test_scan_respects_ignore_patterns() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "keep1.txt", b"dup");
    write_file(dir.path(), "keep2.txt", b"dup");
    write_file(dir.path(), "skip.tmp", b"dup");
    write_file(dir.path(), "cache/copy.txt", b"dup");

    let walker_config = WalkerConfig::default()
        .with_ignore_patterns(vec!["*.tmp".to_string(), "cache/".to_string()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (result, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.groups()[0].paths(),
        vec![dir.path().join("keep1.txt"), dir.path().join("keep2.txt")]
    );
}

#[test]
fn test_scan_with_each_digest_algorithm() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "x.bin", b"payload");
    write_file(dir.path(), "y.bin", b"payload");

    for algorithm in [DigestAlgorithm::Md5, DigestAlgorithm::Sha256, DigestAlgorithm::Blake3] {
        let finder = DuplicateFinder::new(FinderConfig::default().with_algorithm(algorithm));
        let (result, _) = finder.find_duplicates(dir.path()).unwrap();

        assert_eq!(result.len(), 1, "algorithm {algorithm}");
        let group = &result.groups()[0];
        assert_eq!(group.fingerprint.value.len(), algorithm.hex_len());
    }
}

#[test]
fn test_scan_result_map_view() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "one.txt", b"abc");
    write_file(dir.path(), "two.txt", b"abc");

    let (result, _) = DuplicateFinder::new(FinderConfig::default().with_algorithm(DigestAlgorithm::Md5))
        .find_duplicates(dir.path())
        .unwrap();
    let map = result.into_map();

    // md5("abc")
    let key = Fingerprint::new(MediaCategory::Generic, "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(map.len(), 1);
    assert_eq!(
        map[&key],
        vec![dir.path().join("one.txt"), dir.path().join("two.txt")]
    );
}

#[cfg(unix)]
#[test]
fn test_scan_skips_symlinks_by_default() {
    let dir = TempDir::new().unwrap();
    let target = write_file(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (result, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_scan_follows_symlinks_when_enabled() {
    let dir = TempDir::new().unwrap();
    let target = write_file(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let walker_config = WalkerConfig::default().with_follow_symlinks(true);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (result, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.groups()[0].len(), 2);
}

#[test]
fn test_scan_large_file_across_chunks() {
    let dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    write_file(dir.path(), "big1.bin", &content);
    write_file(dir.path(), "big2.bin", &content);
    let mut changed = content.clone();
    changed[99_999] ^= 0xff;
    write_file(dir.path(), "big3.bin", &changed);

    let (result, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.groups()[0].len(), 2);
    assert_eq!(result.groups()[0].total_size(), 200_000);
}
