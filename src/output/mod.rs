//! Duplicate sinks.
//!
//! A sink receives confirmed [`DuplicatePair`]s one at a time, in the order
//! the engine confirmed them, and performs a side effect:
//! - [`ListOutput`]: print the duplicate path (dry run)
//! - [`CsvOutput`]: `"canonical","duplicate"` rows for spreadsheets
//! - [`JsonOutput`]: one JSON object per line for scripting
//! - [`crate::actions::DeleteOutput`]: remove the duplicate
//!
//! Any `FnMut(&DuplicatePair) -> Result<(), SinkError>` closure is a sink too.
//!
//! # Example
//!
//! ```no_run
//! use dedupe::duplicates::DuplicateFinder;
//! use dedupe::output::CsvOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let mut sink = CsvOutput::new(std::io::stdout());
//! let summary = finder.find_duplicates(Path::new("."), &mut sink).unwrap();
//! eprintln!("{} duplicates", summary.duplicate_files);
//! ```

pub mod csv;
pub mod json;
pub mod list;

use std::io;

use thiserror::Error;

use crate::actions::DeleteError;
use crate::duplicates::DuplicatePair;

// Re-export main types
pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::list::ListOutput;

/// Errors raised by a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A duplicate could not be deleted.
    #[error(transparent)]
    Delete(#[from] DeleteError),
}

/// Consumer of confirmed duplicate pairs.
pub trait DuplicateSink {
    /// Handle one pair.
    ///
    /// # Errors
    ///
    /// Returning an error stops the pipeline.
    fn handle(&mut self, pair: &DuplicatePair) -> Result<(), SinkError>;

    /// Flush any buffered output once the stream has ended.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if flushing fails.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<F> DuplicateSink for F
where
    F: FnMut(&DuplicatePair) -> Result<(), SinkError>,
{
    fn handle(&mut self, pair: &DuplicatePair) -> Result<(), SinkError> {
        self(pair)
    }
}
