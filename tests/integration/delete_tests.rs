use dedupe::actions::{DeleteConfig, DeleteOutput};
use dedupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dedupe::output::SinkError;
use dedupe::scanner::WalkerConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_delete_keeps_canonical() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"copy").unwrap();
    fs::write(dir.path().join("b.txt"), b"copy").unwrap();
    fs::write(dir.path().join("c.txt"), b"copy").unwrap();
    fs::write(dir.path().join("d.txt"), b"keep").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let mut sink = DeleteOutput::new(Vec::new(), DeleteConfig::permanent());
    let summary = finder.find_duplicates(dir.path(), &mut sink).unwrap();

    assert_eq!(summary.duplicate_files, 2);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("c.txt").exists());
    assert!(dir.path().join("d.txt").exists());

    let (out, result) = sink.into_parts();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        format!(
            "DELETING: {}\nDELETING: {}\n",
            dir.path().join("b.txt").display(),
            dir.path().join("c.txt").display()
        )
    );
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.bytes_freed, 8);
}

#[test]
fn test_delete_across_directories() {
    let dir = tempdir().unwrap();
    let backup = dir.path().join("backup");
    fs::create_dir(&backup).unwrap();
    fs::write(dir.path().join("photo.jpg"), b"pixels").unwrap();
    fs::write(backup.join("photo.jpg"), b"pixels").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let mut sink = DeleteOutput::new(Vec::new(), DeleteConfig::permanent());
    finder.find_duplicates(dir.path(), &mut sink).unwrap();

    // Children are visited in name order, so backup/ comes first
    assert!(backup.join("photo.jpg").exists());
    assert!(!dir.path().join("photo.jpg").exists());
}

#[test]
fn test_rescan_after_delete_finds_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"twin").unwrap();
    fs::write(dir.path().join("b.txt"), b"twin").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let mut sink = DeleteOutput::new(Vec::new(), DeleteConfig::permanent());
    finder.find_duplicates(dir.path(), &mut sink).unwrap();

    let mut sink = DeleteOutput::new(Vec::new(), DeleteConfig::permanent());
    let summary = finder.find_duplicates(dir.path(), &mut sink).unwrap();
    assert_eq!(summary.duplicate_files, 0);
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_followed_link_never_deletes_its_target() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("z_real.txt");
    fs::write(&real, b"the only copy").unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("a_link.txt")).unwrap();

    let walker_config = WalkerConfig {
        follow_symlinks: true,
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let mut sink = DeleteOutput::new(
        Vec::new(),
        DeleteConfig::permanent().with_continue_on_error(true),
    );
    finder.find_duplicates(dir.path(), &mut sink).unwrap();

    assert!(real.exists());
    let (_, result) = sink.into_parts();
    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failure_count(), 1);
}

#[test]
fn test_failing_sink_stops_pipeline() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("f{i:02}.txt")), b"same").unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let mut calls = 0;
    let mut sink = |_: &dedupe::duplicates::DuplicatePair| -> Result<(), SinkError> {
        calls += 1;
        Err(SinkError::Io(std::io::Error::other("pipe closed")))
    };
    let result = finder.find_duplicates(dir.path(), &mut sink);

    assert!(matches!(result, Err(FinderError::Sink(_))));
    assert_eq!(calls, 1);
}
