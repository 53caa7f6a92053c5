//! Delimited-text input and output.
//!
//! Rows are streamed one at a time; nothing here holds more than the current
//! record. No header row is expected unless [`CsvFormat::has_headers`] is set,
//! and rows may have any number of columns.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{InputRow, OutputRecord};

/// Line terminator written after each output record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n`, as expected by the interface loader.
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl From<LineEnding> for csv::Terminator {
    fn from(ending: LineEnding) -> Self {
        match ending {
            LineEnding::Crlf => csv::Terminator::CRLF,
            LineEnding::Lf => csv::Terminator::Any(b'\n'),
        }
    }
}

/// Shape of the input and output files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvFormat {
    /// Field delimiter for both input and output
    pub delimiter: u8,
    /// Skip the first input line
    pub has_headers: bool,
    /// Output record terminator
    pub line_ending: LineEnding,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
            line_ending: LineEnding::default(),
        }
    }
}

// =============================================================================
// Reading
// =============================================================================

/// Streams input rows from delimited text.
pub struct RowReader<R> {
    inner: csv::Reader<R>,
    record: csv::StringRecord,
    rows_read: u64,
}

impl<R: Read> RowReader<R> {
    pub fn new(reader: R, format: &CsvFormat) -> Self {
        let inner = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(format.has_headers)
            .flexible(true)
            .from_reader(reader);
        Self {
            inner,
            record: csv::StringRecord::new(),
            rows_read: 0,
        }
    }

    /// Next row, or `None` at end of input.
    ///
    /// Read failures carry the 1-based number of the row being read.
    pub fn next_row(&mut self) -> CsvResult<Option<InputRow>> {
        let more = self
            .inner
            .read_record(&mut self.record)
            .map_err(|source| CsvError::Read {
                row: self.rows_read + 1,
                source,
            })?;
        if !more {
            return Ok(None);
        }
        self.rows_read += 1;
        Ok(Some(InputRow::from(&self.record)))
    }
}

impl RowReader<File> {
    /// Open an input file.
    pub fn from_path(path: impl AsRef<Path>, format: &CsvFormat) -> CsvResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(file, format))
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Writes output records as delimited text, quoting only where needed.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W, format: &CsvFormat) -> Self {
        let inner = csv::WriterBuilder::new()
            .delimiter(format.delimiter)
            .terminator(format.line_ending.into())
            .quote_style(csv::QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(writer);
        Self { inner }
    }

    pub fn write(&mut self, record: &OutputRecord) -> CsvResult<()> {
        self.inner.write_record(record.iter())?;
        Ok(())
    }

    pub fn flush(&mut self) -> CsvResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> CsvResult<W> {
        self.inner
            .into_inner()
            .map_err(|e| CsvError::IoError(e.into_error()))
    }
}

impl RecordWriter<File> {
    /// Create (or truncate) an output file.
    pub fn from_path(path: impl AsRef<Path>, format: &CsvFormat) -> CsvResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(file, format))
    }
}
