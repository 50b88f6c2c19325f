//! Scenario tests for the incremental engine, driven through a scripted probe.

use dedupe::duplicates::{DuplicateEngine, DuplicatePair};
use dedupe::scanner::{ContentProbe, FileEntry, Hash, HashError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Probe with scripted fingerprints and equality classes.
#[derive(Default)]
struct ScriptedProbe {
    digests: HashMap<PathBuf, u8>,
    classes: HashMap<PathBuf, u8>,
    unreadable: Vec<PathBuf>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedProbe {
    fn file(mut self, path: &str, digest: u8, class: u8) -> Self {
        self.digests.insert(PathBuf::from(path), digest);
        self.classes.insert(PathBuf::from(path), class);
        self
    }

    fn unreadable(mut self, path: &str) -> Self {
        self.unreadable.push(PathBuf::from(path));
        self
    }

    fn check(&self, path: &Path) -> Result<(), HashError> {
        if self.unreadable.iter().any(|p| p == path) {
            Err(HashError::from_io(
                path,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ))
        } else {
            Ok(())
        }
    }
}

impl ContentProbe for ScriptedProbe {
    fn fingerprint(&self, path: &Path) -> Result<Hash, HashError> {
        self.calls
            .borrow_mut()
            .push(format!("fingerprint {}", path.display()));
        self.check(path)?;
        Ok([self.digests[path]; 32])
    }

    fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        self.calls
            .borrow_mut()
            .push(format!("compare {} {}", a.display(), b.display()));
        self.check(a)?;
        self.check(b)?;
        Ok(self.classes[a] == self.classes[b])
    }
}

fn entry(path: &str, size: u64) -> FileEntry {
    FileEntry::new(path, size)
}

#[test]
fn test_three_identical_files_pair_with_first() {
    let probe = ScriptedProbe::default()
        .file("A", 1, 1)
        .file("B", 1, 1)
        .file("C", 1, 1);

    let pairs: Vec<_> = DuplicateEngine::new(&probe)
        .drain([entry("A", 100), entry("B", 100), entry("C", 100)])
        .collect();

    assert_eq!(
        pairs,
        vec![
            DuplicatePair::new("A", "B", 100),
            DuplicatePair::new("A", "C", 100),
        ]
    );
}

#[test]
fn test_different_sizes_do_no_work() {
    let probe = ScriptedProbe::default().file("A", 1, 1).file("B", 1, 1);

    let mut duplicates = DuplicateEngine::new(&probe).drain([entry("A", 50), entry("B", 51)]);
    assert!(duplicates.next().is_none());

    assert!(probe.calls.borrow().is_empty());
    assert_eq!(duplicates.engine().stats().full_comparisons, 0);
}

#[test]
fn test_equal_fingerprint_different_tail() {
    let probe = ScriptedProbe::default().file("A", 7, 1).file("B", 7, 2);

    let mut duplicates = DuplicateEngine::new(&probe).drain([entry("A", 10), entry("B", 10)]);
    assert!(duplicates.next().is_none());

    let stats = duplicates.into_engine().into_stats();
    assert_eq!(stats.full_comparisons, 1);
    assert_eq!(stats.digest_collisions, 1);
    assert!(stats.errors.is_empty());
}

#[test]
fn test_call_order_is_lazy() {
    let probe = ScriptedProbe::default()
        .file("A", 1, 1)
        .file("B", 2, 2)
        .file("C", 1, 1);

    let pairs: Vec<_> = DuplicateEngine::new(&probe)
        .drain([entry("A", 8), entry("B", 8), entry("C", 8)])
        .collect();

    assert_eq!(pairs, vec![DuplicatePair::new("A", "C", 8)]);
    assert_eq!(
        *probe.calls.borrow(),
        vec![
            "fingerprint B",
            "fingerprint A",
            "fingerprint C",
            "compare A C",
        ]
    );
}

#[test]
fn test_unreadable_member_is_skipped_not_retried() {
    let probe = ScriptedProbe::default()
        .file("A", 1, 1)
        .file("B", 1, 1)
        .file("C", 1, 1)
        .unreadable("A");

    let mut engine = DuplicateEngine::new(&probe);
    assert!(engine.observe(entry("A", 4)).is_none());
    assert!(engine.observe(entry("B", 4)).is_none());
    assert_eq!(
        engine.observe(entry("C", 4)),
        Some(DuplicatePair::new("B", "C", 4))
    );

    let fingerprints_of_a = probe
        .calls
        .borrow()
        .iter()
        .filter(|c| c.as_str() == "fingerprint A")
        .count();
    assert_eq!(fingerprints_of_a, 1);

    let stats = engine.stats();
    assert_eq!(stats.errors.len(), 1);
    assert!(matches!(stats.errors[0], HashError::PermissionDenied(_)));
}

#[test]
fn test_compare_failure_counts_as_not_equal() {
    // Fingerprints succeed for the canonical, the full read fails
    struct FlakyCompare;
    impl ContentProbe for FlakyCompare {
        fn fingerprint(&self, _: &Path) -> Result<Hash, HashError> {
            Ok([0; 32])
        }
        fn contents_equal(&self, a: &Path, _: &Path) -> Result<bool, HashError> {
            Err(HashError::NotFound(a.to_path_buf()))
        }
    }

    let mut duplicates =
        DuplicateEngine::new(FlakyCompare).drain([entry("A", 3), entry("B", 3), entry("C", 3)]);
    assert!(duplicates.next().is_none());

    let stats = duplicates.into_engine().into_stats();
    // B vs A, then C vs A and C vs B
    assert_eq!(stats.full_comparisons, 3);
    assert_eq!(stats.errors.len(), 3);
    assert_eq!(stats.duplicates_found, 0);
}
