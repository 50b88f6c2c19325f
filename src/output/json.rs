//! JSON lines output for duplicate pairs.
//!
//! Each confirmed pair becomes one JSON object on its own line, so the
//! stream can be consumed incrementally with `jq` or any line reader:
//!
//! ```text
//! {"canonical":"/a.txt","duplicate":"/b.txt","size":12}
//! ```

use std::borrow::Cow;
use std::io::{BufWriter, Write};

use serde::Serialize;

use super::{DuplicateSink, SinkError};
use crate::duplicates::DuplicatePair;

/// Serialized form of a pair. Paths that are not valid UTF-8 are written
/// lossily rather than failing the stream.
#[derive(Serialize)]
struct JsonPair<'a> {
    canonical: Cow<'a, str>,
    duplicate: Cow<'a, str>,
    size: u64,
}

impl<'a> From<&'a DuplicatePair> for JsonPair<'a> {
    fn from(pair: &'a DuplicatePair) -> Self {
        Self {
            canonical: pair.canonical.to_string_lossy(),
            duplicate: pair.duplicate.to_string_lossy(),
            size: pair.size,
        }
    }
}

/// Newline-delimited JSON writer.
pub struct JsonOutput<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> JsonOutput<W> {
    /// Create a JSON lines writer.
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

impl<W: Write> DuplicateSink for JsonOutput<W> {
    fn handle(&mut self, pair: &DuplicatePair) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &JsonPair::from(pair))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
