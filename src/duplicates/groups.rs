//! Size buckets and duplicate pairs.
//!
//! # Overview
//!
//! Files with different sizes cannot be duplicates, so the engine keeps every
//! file it has seen in a bucket keyed by exact size. A bucket holds
//! [`FileRecord`]s in discovery order; the first record of a bucket is never
//! fingerprinted until a second file of the same size shows up.
//!
//! # Example
//!
//! ```
//! use dedupe::duplicates::{FileRecord, SizeBuckets};
//! use dedupe::scanner::FileEntry;
//!
//! let mut buckets = SizeBuckets::new();
//! buckets.push(FileRecord::new(FileEntry::new("/a.txt", 1024)));
//! buckets.push(FileRecord::new(FileEntry::new("/b.txt", 1024)));
//! buckets.push(FileRecord::new(FileEntry::new("/c.txt", 2048)));
//!
//! assert_eq!(buckets.len(), 2);
//! assert_eq!(buckets.total_files(), 3);
//! assert_eq!(buckets.colliding_files(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{ContentProbe, FileEntry, Hash, HashError};

/// Fingerprint state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestState {
    /// No size collision yet, nothing has been read.
    Pending,
    /// Prefix fingerprint computed.
    Computed(Hash),
    /// Fingerprinting failed once; the file is never matched again.
    Unreadable,
}

/// A discovered file together with its lazily computed fingerprint.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// The file as reported by the enumerator
    pub entry: FileEntry,
    digest: DigestState,
}

impl FileRecord {
    /// Wrap an entry with no fingerprint.
    #[must_use]
    pub fn new(entry: FileEntry) -> Self {
        Self {
            entry,
            digest: DigestState::Pending,
        }
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    /// Size of the underlying file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.entry.size
    }

    /// Current fingerprint state.
    #[must_use]
    pub fn digest(&self) -> DigestState {
        self.digest
    }

    /// Compute the fingerprint if it is still pending.
    ///
    /// Returns `Ok(Some(hash))` once computed, `Ok(None)` for a record that
    /// already failed, and the error on the call that fails. The probe is
    /// consulted at most once per record.
    ///
    /// # Errors
    ///
    /// Returns the probe's `HashError` the first time fingerprinting fails.
    pub fn ensure_digest<P: ContentProbe>(
        &mut self,
        probe: &P,
    ) -> Result<Option<Hash>, HashError> {
        match self.digest {
            DigestState::Computed(hash) => Ok(Some(hash)),
            DigestState::Unreadable => Ok(None),
            DigestState::Pending => match probe.fingerprint(&self.entry.path) {
                Ok(hash) => {
                    self.digest = DigestState::Computed(hash);
                    Ok(Some(hash))
                }
                Err(e) => {
                    self.digest = DigestState::Unreadable;
                    Err(e)
                }
            },
        }
    }
}

/// All files seen so far that share one exact size.
#[derive(Debug, Clone)]
pub struct SizeBucket {
    /// File size in bytes (shared by all records in this bucket)
    pub size: u64,
    /// Records in discovery order
    pub records: Vec<FileRecord>,
}

impl SizeBucket {
    /// Create a bucket holding a single record.
    #[must_use]
    pub fn with_record(record: FileRecord) -> Self {
        Self {
            size: record.size(),
            records: vec![record],
        }
    }

    /// Append a record.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the record size doesn't match the bucket size.
    pub fn push(&mut self, record: FileRecord) {
        debug_assert_eq!(
            record.size(),
            self.size,
            "File size {} doesn't match bucket size {}",
            record.size(),
            self.size
        );
        self.records.push(record);
    }

    /// Number of records in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if this bucket has seen a size collision (2+ files).
    #[must_use]
    pub fn has_collision(&self) -> bool {
        self.records.len() > 1
    }
}

/// Index of size buckets owned by the duplicate engine.
#[derive(Debug, Clone, Default)]
pub struct SizeBuckets {
    buckets: HashMap<u64, SizeBucket>,
}

impl SizeBuckets {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `size`, if any file of that size has been seen.
    pub fn get_mut(&mut self, size: u64) -> Option<&mut SizeBucket> {
        self.buckets.get_mut(&size)
    }

    /// Bucket for `size`, if any file of that size has been seen.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&SizeBucket> {
        self.buckets.get(&size)
    }

    /// File a record under its size, creating the bucket on first sight.
    pub fn push(&mut self, record: FileRecord) {
        match self.buckets.get_mut(&record.size()) {
            Some(bucket) => bucket.push(record),
            None => {
                self.buckets
                    .insert(record.size(), SizeBucket::with_record(record));
            }
        }
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no file has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of records across all buckets.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.buckets.values().map(SizeBucket::len).sum()
    }

    /// Number of records that share their size with at least one other file.
    #[must_use]
    pub fn colliding_files(&self) -> usize {
        self.buckets
            .values()
            .filter(|b| b.has_collision())
            .map(SizeBucket::len)
            .sum()
    }
}

/// A confirmed duplicate: `duplicate` is byte-identical to `canonical`,
/// and `canonical` was discovered first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// Earliest-discovered member of the equivalence class
    pub canonical: PathBuf,
    /// Later file proven identical to the canonical
    pub duplicate: PathBuf,
    /// Size in bytes of both files
    pub size: u64,
}

impl DuplicatePair {
    /// Create a new pair.
    #[must_use]
    pub fn new(canonical: impl Into<PathBuf>, duplicate: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            canonical: canonical.into(),
            duplicate: duplicate.into(),
            size,
        }
    }
}
