//! Plain list output: one duplicate path per line.
//!
//! This is the dry-run view. It lists exactly the files a delete run would
//! remove, leaving out the canonical copies.

use std::io::{BufWriter, Write};

use super::{DuplicateSink, SinkError};
use crate::duplicates::DuplicatePair;

/// Line-per-duplicate writer.
pub struct ListOutput<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> ListOutput<W> {
    /// Create a list writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush and return the inner writer.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the final flush fails.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> DuplicateSink for ListOutput<W> {
    fn handle(&mut self, pair: &DuplicatePair) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", pair.duplicate.display())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
