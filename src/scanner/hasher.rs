//! Prefix fingerprints and byte-for-byte comparison.
//!
//! # Overview
//!
//! Two primitives back the duplicate engine:
//! - [`fingerprint`]: BLAKE3 over at most `limit` bytes of a reader. A
//!   source shorter than the limit is the normal case for small files.
//! - [`streams_equal`]: chunked comparison of two readers, true only when
//!   both have the same length and the same bytes.
//!
//! [`Hasher`] applies them to files on disk and implements
//! [`ContentProbe`], the capability the engine is constructed with.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use super::HashError;

/// Size of the fingerprint window (first 4KB of a file).
pub const PREHASH_SIZE: usize = 4096;

/// Buffer size used when streaming two files side by side.
const COMPARE_BUFFER_SIZE: usize = 64 * 1024;

/// BLAKE3 digest.
pub type Hash = [u8; 32];

/// Fingerprint and comparison capability consumed by the duplicate engine.
///
/// The engine never touches the filesystem itself; tests hand it fakes.
pub trait ContentProbe {
    /// Digest over a bounded prefix of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be opened or read.
    fn fingerprint(&self, path: &Path) -> Result<Hash, HashError>;

    /// Whether the two files have identical length and bytes.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if either file cannot be opened or read.
    fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError>;
}

impl<T: ContentProbe + ?Sized> ContentProbe for &T {
    fn fingerprint(&self, path: &Path) -> Result<Hash, HashError> {
        (**self).fingerprint(path)
    }

    fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        (**self).contents_equal(a, b)
    }
}

/// Compute a BLAKE3 digest over at most `limit` bytes of `source`.
///
/// # Errors
///
/// Propagates read errors from `source`.
///
/// # Example
///
/// ```
/// use dedupe::scanner::fingerprint;
///
/// let short = fingerprint(&b"abc"[..], 4096).unwrap();
/// let same = fingerprint(&b"abcdef"[..], 3).unwrap();
/// assert_eq!(short, same);
/// ```
pub fn fingerprint<R: Read>(source: R, limit: u64) -> io::Result<Hash> {
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut source.take(limit), &mut hasher)?;
    Ok(*hasher.finalize().as_bytes())
}

/// Compare two readers chunk by chunk.
///
/// Stops at the first differing chunk, so mismatching files are usually
/// rejected long before either is fully read.
///
/// # Errors
///
/// Propagates read errors from either side.
pub fn streams_equal<A: Read, B: Read>(a: A, b: B) -> io::Result<bool> {
    let mut a = BufReader::with_capacity(COMPARE_BUFFER_SIZE, a);
    let mut b = BufReader::with_capacity(COMPARE_BUFFER_SIZE, b);

    loop {
        let n = {
            let chunk_a = a.fill_buf()?;
            let chunk_b = b.fill_buf()?;
            if chunk_a.is_empty() || chunk_b.is_empty() {
                return Ok(chunk_a.is_empty() && chunk_b.is_empty());
            }
            let n = chunk_a.len().min(chunk_b.len());
            if chunk_a[..n] != chunk_b[..n] {
                return Ok(false);
            }
            n
        };
        a.consume(n);
        b.consume(n);
    }
}

/// Convert a hash to a hexadecimal string.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Compare two files on disk, treating any failure as "not equal".
#[must_use]
pub fn files_equal(a: &Path, b: &Path) -> bool {
    Hasher::new().contents_equal(a, b).unwrap_or(false)
}

/// File-backed [`ContentProbe`].
#[derive(Debug, Clone)]
pub struct Hasher {
    /// Number of leading bytes covered by a fingerprint
    prehash_size: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 4KB fingerprint window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prehash_size: PREHASH_SIZE as u64,
        }
    }

    /// Set the fingerprint window. Zero is raised to one byte.
    #[must_use]
    pub fn with_prehash_size(mut self, bytes: u64) -> Self {
        self.prehash_size = bytes.max(1);
        self
    }

    /// Current fingerprint window in bytes.
    #[must_use]
    pub fn prehash_size(&self) -> u64 {
        self.prehash_size
    }

    /// Digest the first `prehash_size` bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = open(path)?;
        fingerprint(file, self.prehash_size).map_err(|e| HashError::from_io(path, e))
    }

    /// Full byte-for-byte comparison of two files.
    ///
    /// Both handles live only for the duration of this call.
    ///
    /// # Errors
    ///
    /// Returns `HashError` naming the file that failed.
    pub fn compare(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let file_a = open(a)?;
        let file_b = open(b)?;

        let len_a = file_a
            .metadata()
            .map_err(|e| HashError::from_io(a, e))?
            .len();
        let len_b = file_b
            .metadata()
            .map_err(|e| HashError::from_io(b, e))?
            .len();
        if len_a != len_b {
            return Ok(false);
        }

        // The error kind does not say which side failed, so report the pair's first path.
        streams_equal(file_a, file_b).map_err(|e| HashError::from_io(a, e))
    }
}

impl ContentProbe for Hasher {
    fn fingerprint(&self, path: &Path) -> Result<Hash, HashError> {
        self.prehash(path)
    }

    fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        self.compare(a, b)
    }
}

fn open(path: &Path) -> Result<File, HashError> {
    File::open(path).map_err(|e| HashError::from_io(path, e))
}
