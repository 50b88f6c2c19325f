//! Safe file deletion using trash crate.
//!
//! # Overview
//!
//! This module provides the deleting sink and its building blocks:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (with explicit flag)
//! - Size verification before deletion
//! - Per-run bookkeeping of successes and failures
//!
//! # Safety
//!
//! A duplicate is only removed while its canonical copy still exists, so the
//! last copy of a file is never deleted by this module.
//!
//! # Example
//!
//! ```no_run
//! use dedupe::actions::delete::delete_to_trash;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/duplicate.txt");
//! match delete_to_trash(&path) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::DuplicatePair;
use crate::output::{DuplicateSink, SinkError};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0} - try running with elevated privileges")]
    PermissionDenied(PathBuf),

    /// File size changed since it was compared.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The canonical copy is gone, so the duplicate is the last copy.
    #[error("refusing to delete {duplicate}: canonical copy {canonical} no longer exists")]
    CanonicalMissing {
        canonical: PathBuf,
        duplicate: PathBuf,
    },

    /// Both sides of the pair resolve to the same file on disk.
    #[error("refusing to delete {duplicate}: it is the same file as {canonical}")]
    SameFile {
        canonical: PathBuf,
        duplicate: PathBuf,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
            Self::CanonicalMissing { duplicate, .. } | Self::SameFile { duplicate, .. } => {
                duplicate
            }
        }
    }

    fn from_metadata(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {} bytes",
                self.success_count(),
                self.bytes_freed
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {} bytes",
                self.success_count(),
                self.failure_count(),
                self.bytes_freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
    /// Refuse to delete a duplicate whose size changed since the scan.
    pub verify_size: bool,
    /// Continue on error (process remaining files even if some fail).
    pub continue_on_error: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            permanent: false,
            verify_size: true,
            continue_on_error: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            ..Self::default()
        }
    }

    /// Enable/disable size verification.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }

    /// Enable/disable continue on error.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}

/// Delete a single file to the system trash.
///
/// This is the safest deletion method - files can be recovered from trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete the duplicate side of a confirmed pair.
///
/// # Errors
///
/// - `CanonicalMissing` if the canonical copy no longer exists
/// - `SameFile` if both paths resolve to one file, e.g. through a symlink
/// - `Modified` if the duplicate's size no longer matches the pair
/// - Other errors from `delete_to_trash` or `permanent_delete`
pub fn delete_duplicate(
    pair: &DuplicatePair,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    if !pair.canonical.is_file() {
        return Err(DeleteError::CanonicalMissing {
            canonical: pair.canonical.clone(),
            duplicate: pair.duplicate.clone(),
        });
    }

    let resolved = fs::canonicalize(&pair.duplicate)
        .map_err(|e| DeleteError::from_metadata(&pair.duplicate, e))?;
    if fs::canonicalize(&pair.canonical).is_ok_and(|c| c == resolved) {
        log::warn!(
            "Skipping {}: same file as {}",
            pair.duplicate.display(),
            pair.canonical.display()
        );
        return Err(DeleteError::SameFile {
            canonical: pair.canonical.clone(),
            duplicate: pair.duplicate.clone(),
        });
    }

    if config.verify_size {
        let current = fs::metadata(&pair.duplicate)
            .map_err(|e| DeleteError::from_metadata(&pair.duplicate, e))?
            .len();
        if current != pair.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                pair.duplicate.display(),
                pair.size,
                current
            );
            return Err(DeleteError::Modified(pair.duplicate.clone()));
        }
    }

    if config.permanent {
        permanent_delete(&pair.duplicate)
    } else {
        delete_to_trash(&pair.duplicate)
    }
}

/// Sink that removes every duplicate it receives.
///
/// Each path is announced on the writer as `DELETING: <path>` before it is
/// removed. With `continue_on_error`, a failed deletion is recorded and the
/// stream goes on; otherwise it stops the pipeline.
pub struct DeleteOutput<W: Write> {
    writer: W,
    config: DeleteConfig,
    result: BatchDeleteResult,
}

impl<W: Write> DeleteOutput<W> {
    /// Create a deleting sink that announces each deletion on `writer`.
    #[must_use]
    pub fn new(writer: W, config: DeleteConfig) -> Self {
        Self {
            writer,
            config,
            result: BatchDeleteResult::default(),
        }
    }

    /// Deletions performed so far.
    #[must_use]
    pub fn result(&self) -> &BatchDeleteResult {
        &self.result
    }

    /// Consume the sink, returning the writer and the deletion record.
    #[must_use]
    pub fn into_parts(self) -> (W, BatchDeleteResult) {
        (self.writer, self.result)
    }
}

impl<W: Write> DuplicateSink for DeleteOutput<W> {
    fn handle(&mut self, pair: &DuplicatePair) -> Result<(), SinkError> {
        writeln!(self.writer, "DELETING: {}", pair.duplicate.display())?;

        match delete_duplicate(pair, &self.config) {
            Ok(deleted) => {
                self.result.bytes_freed += deleted.size;
                self.result.successes.push(deleted);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", pair.duplicate.display(), e);
                self.result
                    .failures
                    .push((pair.duplicate.clone(), e.to_string()));
                if self.config.continue_on_error {
                    Ok(())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        log::info!("{}", self.result.summary());
        Ok(())
    }
}
