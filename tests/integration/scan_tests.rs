use dedupe::duplicates::{DuplicateFinder, DuplicatePair, FinderConfig};
use dedupe::output::SinkError;
use dedupe::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn collect(finder: &DuplicateFinder, root: &Path) -> Vec<DuplicatePair> {
    let mut pairs = Vec::new();
    let mut sink = |pair: &DuplicatePair| -> Result<(), SinkError> {
        pairs.push(pair.clone());
        Ok(())
    };
    finder.find_duplicates(root, &mut sink).unwrap();
    pairs
}

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let mut sink = |_: &DuplicatePair| -> Result<(), SinkError> { Ok(()) };
    let summary = finder.find_duplicates(dir.path(), &mut sink).unwrap();

    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_files, 0);
    assert!(!summary.has_errors());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content cc");

    let pairs = collect(&DuplicateFinder::with_defaults(), dir.path());
    assert!(pairs.is_empty());
}

#[test]
fn test_scan_three_copies_share_canonical() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"duplicate");
    write(&dir.path().join("b.txt"), b"duplicate");
    write(&dir.path().join("c.txt"), b"duplicate");

    let pairs = collect(&DuplicateFinder::with_defaults(), dir.path());

    let a = dir.path().join("a.txt");
    assert_eq!(
        pairs,
        vec![
            DuplicatePair::new(&a, dir.path().join("b.txt"), 9),
            DuplicatePair::new(&a, dir.path().join("c.txt"), 9),
        ]
    );
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();

    write(&dir.path().join("a.txt"), b"nested dup");
    write(&sub.join("b.txt"), b"nested dup");

    let pairs = collect(&DuplicateFinder::with_defaults(), dir.path());
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].canonical, dir.path().join("a.txt"));
    assert_eq!(pairs[0].duplicate, sub.join("b.txt"));
}

#[test]
fn test_scan_same_prefix_different_tail() {
    let dir = tempdir().unwrap();
    let mut a = vec![b'x'; 8192];
    let mut b = a.clone();
    a.push(b'1');
    b.push(b'2');
    write(&dir.path().join("a.bin"), &a);
    write(&dir.path().join("b.bin"), &b);

    let finder = DuplicateFinder::with_defaults();
    let mut pairs = Vec::new();
    let mut sink = |pair: &DuplicatePair| -> Result<(), SinkError> {
        pairs.push(pair.clone());
        Ok(())
    };
    let summary = finder.find_duplicates(dir.path(), &mut sink).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.full_comparisons, 1);
    assert_eq!(summary.digest_collisions, 1);
}

#[test]
fn test_scan_distinct_sizes_never_fingerprinted() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        write(&dir.path().join(format!("f{i}.txt")), &vec![b'a'; i + 1]);
    }

    let finder = DuplicateFinder::with_defaults();
    let mut sink = |_: &DuplicatePair| -> Result<(), SinkError> { Ok(()) };
    let summary = finder.find_duplicates(dir.path(), &mut sink).unwrap();

    assert_eq!(summary.total_files, 10);
    assert_eq!(summary.fingerprints_computed, 0);
    assert_eq!(summary.full_comparisons, 0);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"");
    write(&dir.path().join("b.txt"), b"");

    let pairs = collect(&DuplicateFinder::with_defaults(), dir.path());
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].size, 0);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        skip_empty: true,
        ..Default::default()
    });
    assert!(collect(&DuplicateFinder::new(config), dir.path()).is_empty());
}

#[test]
fn test_scan_with_size_filters() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1.txt"), b"s");
    write(&dir.path().join("small2.txt"), b"s");
    write(&dir.path().join("large1.txt"), &[b'L'; 100]);
    write(&dir.path().join("large2.txt"), &[b'L'; 100]);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(10),
        ..Default::default()
    });
    let pairs = collect(&DuplicateFinder::new(config), dir.path());

    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].size, 100);
}

#[test]
fn test_scan_with_ignore_patterns() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"same");
    write(&dir.path().join("b.tmp"), b"same");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        ignore_patterns: vec!["*.tmp".to_string()],
        ..Default::default()
    });
    assert!(collect(&DuplicateFinder::new(config), dir.path()).is_empty());
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"one");
    write(&dir.path().join("b.txt"), b"one");
    write(&dir.path().join("c.txt"), b"two");
    write(&dir.path().join("d.txt"), b"two");

    let finder = DuplicateFinder::with_defaults();
    let first = collect(&finder, dir.path());
    let second = collect(&finder, dir.path());

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_scan_small_prehash_window() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"abXXXX");
    write(&dir.path().join("b.txt"), b"abYYYY");
    write(&dir.path().join("c.txt"), b"abXXXX");

    let finder = DuplicateFinder::new(FinderConfig::default().with_prehash_size(2));
    let mut pairs = Vec::new();
    let mut sink = |pair: &DuplicatePair| -> Result<(), SinkError> {
        pairs.push(pair.clone());
        Ok(())
    };
    let summary = finder.find_duplicates(dir.path(), &mut sink).unwrap();

    assert_eq!(
        pairs,
        vec![DuplicatePair::new(
            dir.path().join("a.txt"),
            dir.path().join("c.txt"),
            6
        )]
    );
    // b is rejected by the full comparison, c matches a on the first try
    assert_eq!(summary.digest_collisions, 1);
}
