//! CSV output formatter for duplicate pairs.
//!
//! One row is generated for each confirmed duplicate, and every field is
//! quoted:
//!
//! ```text
//! "/photos/a.jpg","/photos/backup/a.jpg"
//! ```
//!
//! # Columns
//!
//! - `canonical`: Path of the first-discovered copy
//! - `duplicate`: Path of the later identical file
//!
//! A header row is only written when requested with
//! [`CsvOutput::with_header`].

use std::io;

use csv::{QuoteStyle, Writer, WriterBuilder};

use super::{DuplicateSink, SinkError};
use crate::duplicates::DuplicatePair;

/// Column names written when a header is requested.
const HEADER: [&str; 2] = ["canonical", "duplicate"];

/// CSV output formatter.
pub struct CsvOutput<W: io::Write> {
    writer: Writer<W>,
    header: bool,
    header_written: bool,
}

impl<W: io::Write> CsvOutput<W> {
    /// Create a new CSV output formatter without a header row.
    #[must_use]
    pub fn new(writer: W) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);
        Self {
            writer,
            header: false,
            header_written: false,
        }
    }

    /// Emit a `canonical,duplicate` header before the first row.
    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Flush and return the inner writer.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the final flush fails.
    pub fn into_inner(mut self) -> Result<W, SinkError> {
        self.write_header()?;
        self.writer.into_inner().map_err(|e| {
            let err = e.error();
            SinkError::Io(io::Error::new(err.kind(), err.to_string()))
        })
    }

    fn write_header(&mut self) -> Result<(), SinkError> {
        if self.header && !self.header_written {
            self.writer.write_record(HEADER)?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl<W: io::Write> DuplicateSink for CsvOutput<W> {
    fn handle(&mut self, pair: &DuplicatePair) -> Result<(), SinkError> {
        self.write_header()?;
        let canonical = pair.canonical.to_string_lossy();
        let duplicate = pair.duplicate.to_string_lossy();
        self.writer.write_record([&*canonical, &*duplicate])?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.write_header()?;
        self.writer.flush()?;
        Ok(())
    }
}
