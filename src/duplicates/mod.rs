//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size buckets of every file seen so far
//! - Lazy prefix fingerprints on size collisions
//! - Full byte comparison before a pair is reported
//! - The walker → engine → sink pipeline

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateEngine, DuplicateFinder, Duplicates, EngineStats, FinderConfig, FinderError,
    ScanSummary, DEFAULT_CHANNEL_CAPACITY,
};
pub use groups::{DigestState, DuplicatePair, FileRecord, SizeBucket, SizeBuckets};
