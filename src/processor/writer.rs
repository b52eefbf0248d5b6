//! Output writing for P-Code records
//!
//! CSV output carries the six column names as its header row, optionally
//! followed by the HXL tag row. JSON output is an array of flat objects.

use crate::constants::{DATA_HEADERS, HXL_HEADERS};
use crate::error::{PcodeError, Result};
use crate::models::PCode;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Streams records to CSV
pub struct PCodeWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl PCodeWriter<File> {
    /// Create a writer for a new file
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> PCodeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(inner),
            rows_written: 0,
        }
    }

    /// Write the column names, and the HXL tag row if requested
    pub fn write_headers(&mut self, with_hxl: bool) -> Result<()> {
        self.writer.write_record(DATA_HEADERS)?;
        if with_hxl {
            self.writer.write_record(HXL_HEADERS)?;
        }
        Ok(())
    }

    pub fn write(&mut self, pcode: &PCode) -> Result<()> {
        self.writer.write_record(pcode.fields())?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_all<'a>(&mut self, pcodes: impl IntoIterator<Item = &'a PCode>) -> Result<()> {
        for pcode in pcodes {
            self.write(pcode)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| PcodeError::Io(e.into_error()))
    }

    /// Flush and return the number of records written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        debug!("Wrote {} P-Code rows", self.rows_written);
        Ok(self.rows_written)
    }
}

/// Write records as a pretty-printed JSON array
pub fn write_json<W: Write>(mut out: W, pcodes: &[PCode]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, pcodes).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
