//! Incremental duplicate detection.
//!
//! # Overview
//!
//! [`DuplicateEngine`] consumes files one at a time and emits a
//! [`DuplicatePair`] as soon as a file is proven identical to an earlier one:
//! 1. **Size bucket**: a file whose size has not been seen before is filed
//!    away without reading a single byte.
//! 2. **Fingerprint**: on a size collision the newcomer and each earlier
//!    same-size file are fingerprinted (first 4KB, computed once per file).
//! 3. **Full comparison**: matching fingerprints are only a hint; the pair
//!    is emitted after a byte-for-byte comparison succeeds.
//!
//! The first bucket member that compares equal becomes the canonical, so a
//! third identical file is reported against the first copy, never against
//! the second.
//!
//! [`DuplicateFinder`] wires the engine into a walker → engine → sink
//! pipeline over bounded channels.
//!
//! # Example
//!
//! ```no_run
//! use dedupe::duplicates::DuplicateEngine;
//! use dedupe::scanner::{FileEntry, Hasher};
//!
//! let files = vec![
//!     FileEntry::new("/tmp/a.txt", 12),
//!     FileEntry::new("/tmp/b.txt", 12),
//! ];
//!
//! let hasher = Hasher::new();
//! for pair in DuplicateEngine::new(&hasher).drain(files) {
//!     println!("{} duplicates {}", pair.duplicate.display(), pair.canonical.display());
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::bounded;

use super::groups::{DigestState, DuplicatePair, FileRecord, SizeBucket, SizeBuckets};
use crate::output::{DuplicateSink, SinkError};
use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_to_hex, ContentProbe, FileEntry, Hash, HashError, Hasher, ScanError, Walker,
    WalkerConfig, PREHASH_SIZE,
};

/// Default capacity of the walker → engine and engine → sink queues.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Counters kept by the engine while it runs.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Files observed
    pub files_seen: usize,
    /// Sum of the sizes of all observed files
    pub bytes_seen: u64,
    /// Prefix fingerprints computed
    pub fingerprints_computed: usize,
    /// Full byte-for-byte comparisons performed
    pub full_comparisons: usize,
    /// Matching fingerprints rejected by full comparison
    pub digest_collisions: usize,
    /// Duplicate pairs emitted
    pub duplicates_found: usize,
    /// Bytes that removing every duplicate would free
    pub reclaimable_bytes: u64,
    /// Fingerprint and comparison failures, each treated as "not equal"
    pub errors: Vec<HashError>,
}

/// Incremental duplicate detector.
///
/// Owns the size-bucket index for the lifetime of a scan. It is driven by a
/// single caller; the pipeline gives it a thread of its own.
#[derive(Debug)]
pub struct DuplicateEngine<P> {
    probe: P,
    buckets: SizeBuckets,
    stats: EngineStats,
}

impl<P: ContentProbe> DuplicateEngine<P> {
    /// Create an engine that reads file contents through `probe`.
    #[must_use]
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            buckets: SizeBuckets::new(),
            stats: EngineStats::default(),
        }
    }

    /// Feed one file to the engine.
    ///
    /// Returns the pair if `entry` is a byte-identical copy of an earlier
    /// file. The entry is kept as a comparison target either way.
    pub fn observe(&mut self, entry: FileEntry) -> Option<DuplicatePair> {
        let Self {
            ref probe,
            ref mut buckets,
            ref mut stats,
        } = *self;

        stats.files_seen += 1;
        stats.bytes_seen += entry.size;

        let Some(bucket) = buckets.get_mut(entry.size) else {
            log::trace!("First file of size {}: {}", entry.size, entry.path.display());
            buckets.push(FileRecord::new(entry));
            return None;
        };

        let mut record = FileRecord::new(entry);
        let pair = match digest_of(probe, &mut record, stats) {
            Some(digest) => find_match(probe, bucket, &record, digest, stats),
            None => None,
        };
        bucket.push(record);

        if let Some(ref pair) = pair {
            stats.duplicates_found += 1;
            stats.reclaimable_bytes += pair.size;
            log::debug!(
                "Duplicate: {} == {}",
                pair.duplicate.display(),
                pair.canonical.display()
            );
        }
        pair
    }

    /// Turn an input sequence into a lazy sequence of duplicate pairs.
    pub fn drain<I>(self, entries: I) -> Duplicates<I::IntoIter, P>
    where
        I: IntoIterator<Item = FileEntry>,
    {
        Duplicates {
            entries: entries.into_iter(),
            engine: self,
        }
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Consume the engine, keeping only its counters.
    #[must_use]
    pub fn into_stats(self) -> EngineStats {
        self.stats
    }

    /// Size buckets built so far.
    #[must_use]
    pub fn buckets(&self) -> &SizeBuckets {
        &self.buckets
    }
}

/// Fingerprint `record` unless it already has one, folding failures into `stats`.
fn digest_of<P: ContentProbe>(
    probe: &P,
    record: &mut FileRecord,
    stats: &mut EngineStats,
) -> Option<Hash> {
    let pending = record.digest() == DigestState::Pending;
    match record.ensure_digest(probe) {
        Ok(digest) => {
            if pending {
                stats.fingerprints_computed += 1;
                if let Some(ref d) = digest {
                    log::trace!("Fingerprint {}: {}", hash_to_hex(d), record.path().display());
                }
            }
            digest
        }
        Err(e) => {
            log::warn!("Failed to fingerprint {}: {}", record.path().display(), e);
            stats.errors.push(e);
            None
        }
    }
}

/// First earlier record in `bucket` whose contents equal `record`.
fn find_match<P: ContentProbe>(
    probe: &P,
    bucket: &mut SizeBucket,
    record: &FileRecord,
    digest: Hash,
    stats: &mut EngineStats,
) -> Option<DuplicatePair> {
    for candidate in &mut bucket.records {
        let Some(candidate_digest) = digest_of(probe, candidate, stats) else {
            continue;
        };
        if candidate_digest != digest {
            continue;
        }

        stats.full_comparisons += 1;
        match probe.contents_equal(candidate.path(), record.path()) {
            Ok(true) => {
                return Some(DuplicatePair::new(
                    candidate.path(),
                    record.path(),
                    record.size(),
                ));
            }
            Ok(false) => {
                stats.digest_collisions += 1;
                log::debug!(
                    "Fingerprint collision rejected by full comparison: {} vs {}",
                    candidate.path().display(),
                    record.path().display()
                );
            }
            Err(e) => {
                log::warn!(
                    "Failed to compare {} with {}: {}",
                    candidate.path().display(),
                    record.path().display(),
                    e
                );
                stats.errors.push(e);
            }
        }
    }
    None
}

/// Lazy duplicate stream returned by [`DuplicateEngine::drain`].
#[derive(Debug)]
pub struct Duplicates<I, P> {
    entries: I,
    engine: DuplicateEngine<P>,
}

impl<I, P> Duplicates<I, P> {
    /// The engine driving this stream.
    #[must_use]
    pub fn engine(&self) -> &DuplicateEngine<P> {
        &self.engine
    }

    /// Stop early and recover the engine.
    #[must_use]
    pub fn into_engine(self) -> DuplicateEngine<P> {
        self.engine
    }
}

impl<I, P> Iterator for Duplicates<I, P>
where
    I: Iterator<Item = FileEntry>,
    P: ContentProbe,
{
    type Item = DuplicatePair;

    fn next(&mut self) -> Option<DuplicatePair> {
        for entry in self.entries.by_ref() {
            if let Some(pair) = self.engine.observe(entry) {
                return Some(pair);
            }
        }
        None
    }
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Number of leading bytes covered by a fingerprint.
    pub prehash_size: u64,
    /// Capacity of each pipeline queue.
    pub channel_capacity: usize,
    /// Fail-fast on the first enumeration error.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("prehash_size", &self.prehash_size)
            .field("channel_capacity", &self.channel_capacity)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            prehash_size: PREHASH_SIZE as u64,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            strict: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the fingerprint window in bytes.
    #[must_use]
    pub fn with_prehash_size(mut self, bytes: u64) -> Self {
        self.prehash_size = bytes.max(1);
        self
    }

    /// Set the capacity of the pipeline queues.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Set fail-fast on any enumeration error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of prefix fingerprints computed
    pub fingerprints_computed: usize,
    /// Number of full byte-for-byte comparisons
    pub full_comparisons: usize,
    /// Fingerprint matches rejected by full comparison
    pub digest_collisions: usize,
    /// Number of duplicate files (excluding canonicals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: std::time::Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Enumeration errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
    /// Fingerprint and comparison errors encountered during the scan
    pub hash_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Build a summary from the engine's counters.
    #[must_use]
    pub fn from_engine(stats: EngineStats) -> Self {
        Self {
            total_files: stats.files_seen,
            total_size: stats.bytes_seen,
            fingerprints_computed: stats.fingerprints_computed,
            full_comparisons: stats.full_comparisons,
            digest_collisions: stats.digest_collisions,
            duplicate_files: stats.duplicates_found,
            reclaimable_space: stats.reclaimable_bytes,
            hash_errors: stats.errors,
            ..Default::default()
        }
    }

    /// Whether any non-fatal error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty() || !self.hash_errors.is_empty()
    }

    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        format_size(self.reclaimable_space)
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size as a human-readable string.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(std::path::PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(std::path::PathBuf),

    /// An enumeration error occurred in strict mode.
    #[error(transparent)]
    ScanError(#[from] ScanError),

    /// The sink rejected a duplicate pair.
    #[error("Output failed: {0}")]
    Sink(#[from] SinkError),
}

/// Duplicate finder that runs the walker → engine → sink pipeline.
///
/// # Example
///
/// ```no_run
/// use dedupe::duplicates::{DuplicateFinder, FinderConfig};
/// use dedupe::output::ListOutput;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default());
/// let mut sink = ListOutput::new(std::io::stdout());
///
/// let summary = finder.find_duplicates(Path::new("/some/path"), &mut sink).unwrap();
///
/// println!("Found {} duplicates", summary.duplicate_files);
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder<P = Hasher> {
    config: FinderConfig,
    probe: P,
}

impl DuplicateFinder<Hasher> {
    /// Create a new duplicate finder reading real files.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new().with_prehash_size(config.prehash_size);
        Self::with_probe(config, hasher)
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }
}

impl<P: ContentProbe> DuplicateFinder<P> {
    /// Create a finder that reads contents through a custom probe.
    #[must_use]
    pub fn with_probe(config: FinderConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// Finder configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan `path` and hand every confirmed duplicate pair to `sink`.
    ///
    /// The walker, the engine and the sink run concurrently; pairs reach the
    /// sink in the order the engine confirms them. The sink's `finish` is
    /// called once the stream ends.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The sink fails
    /// - `strict` is set and a file cannot be enumerated
    /// - The scan is interrupted by the shutdown flag
    pub fn find_duplicates(
        &self,
        path: &Path,
        sink: &mut dyn DuplicateSink,
    ) -> Result<ScanSummary, FinderError>
    where
        P: Sync,
    {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Starting duplicate scan of {}", path.display());

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let progress = self.config.progress_callback.clone();
        if let Some(ref callback) = progress {
            callback.on_phase_start("scanning", 0);
            callback.on_message(&format!("Scanning {}", path.display()));
        }

        let (entry_tx, entry_rx) = bounded::<FileEntry>(self.config.channel_capacity);
        let (pair_tx, pair_rx) = bounded::<DuplicatePair>(self.config.channel_capacity);
        let strict = self.config.strict;
        let probe = &self.probe;
        let walker = &walker;

        let (stats, walked, sink_error) = std::thread::scope(|scope| {
            let walk_handle = scope.spawn(move || -> Result<Vec<ScanError>, ScanError> {
                let mut errors = Vec::new();
                for result in walker.walk() {
                    match result {
                        Ok(entry) => {
                            if entry_tx.send(entry).is_err() {
                                log::debug!("Walker: engine stopped, ending walk");
                                break;
                            }
                        }
                        Err(e) if strict => return Err(e),
                        Err(e) => errors.push(e),
                    }
                }
                Ok(errors)
            });

            let engine_progress = progress.clone();
            let engine_handle = scope.spawn(move || {
                let mut engine = DuplicateEngine::new(probe);
                for entry in entry_rx.iter() {
                    if let Some(ref callback) = engine_progress {
                        callback.on_progress(
                            engine.stats().files_seen + 1,
                            entry.path.to_string_lossy().as_ref(),
                        );
                    }
                    if let Some(pair) = engine.observe(entry) {
                        if pair_tx.send(pair).is_err() {
                            log::debug!("Engine: sink stopped, ending scan");
                            break;
                        }
                    }
                }
                let buckets = engine.buckets();
                log::debug!(
                    "Engine finished: {} size buckets, {} files in shared sizes",
                    buckets.len(),
                    buckets.colliding_files()
                );
                engine.into_stats()
            });

            let mut sink_error = None;
            let mut delivered = 0usize;
            for pair in pair_rx.iter() {
                if let Err(e) = sink.handle(&pair) {
                    log::error!("Output failed for {}: {}", pair.duplicate.display(), e);
                    sink_error = Some(e);
                    break;
                }
                delivered += 1;
                if let Some(ref callback) = progress {
                    callback.on_message(&format!("{} duplicates", delivered));
                }
            }
            // Disconnecting here unblocks an engine waiting on a full queue.
            drop(pair_rx);

            let stats = engine_handle
                .join()
                .unwrap_or_else(|e| std::panic::resume_unwind(e));
            let walked = walk_handle
                .join()
                .unwrap_or_else(|e| std::panic::resume_unwind(e));
            (stats, walked, sink_error)
        });

        if let Some(ref callback) = progress {
            callback.on_phase_end("scanning");
        }

        if let Some(e) = sink_error {
            return Err(FinderError::Sink(e));
        }
        sink.finish()?;
        let scan_errors = walked?;

        let mut summary = ScanSummary::from_engine(stats);
        summary.scan_errors = scan_errors;
        summary.scan_duration = start_time.elapsed();

        if self.config.is_shutdown_requested() {
            log::info!(
                "Scan interrupted after {} files ({} duplicates delivered)",
                summary.total_files,
                summary.duplicate_files
            );
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Scan complete: {} files ({}), {} duplicates, {} reclaimable ({:.1}%) in {:.2?}",
            summary.total_files,
            summary.total_size_display(),
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.wasted_percentage(),
            summary.scan_duration
        );
        log::debug!(
            "Work done: {} fingerprints, {} full comparisons, {} collisions, {} errors",
            summary.fingerprints_computed,
            summary.full_comparisons,
            summary.digest_collisions,
            summary.scan_errors.len() + summary.hash_errors.len()
        );

        Ok(summary)
    }

    /// Run the engine synchronously over an already enumerated file list.
    ///
    /// Stops pulling input once the shutdown flag is set and marks the
    /// summary as interrupted.
    #[must_use]
    pub fn find_duplicates_from_files<I>(&self, files: I) -> (Vec<DuplicatePair>, ScanSummary)
    where
        I: IntoIterator<Item = FileEntry>,
    {
        let start_time = Instant::now();
        let shutdown = self.config.shutdown_flag.clone();
        let input = files.into_iter().take_while(move |_| {
            !shutdown
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
        });

        let mut duplicates = DuplicateEngine::new(&self.probe).drain(input);
        let pairs: Vec<DuplicatePair> = duplicates.by_ref().collect();

        let mut summary = ScanSummary::from_engine(duplicates.into_engine().into_stats());
        summary.scan_duration = start_time.elapsed();
        summary.interrupted = self.config.is_shutdown_requested();
        (pairs, summary)
    }
}
