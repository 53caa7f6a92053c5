//! Batch driver: one sequential pass from input extract to interface file.
//!
//! Reads each input row, assigns its transaction id, runs the mapping table
//! over it and writes the resulting records before reading the next row.
//!
//! # Example
//!
//! ```rust,ignore
//! use starterfeed::{BatchDriver, BatchOptions, MappingTable, TransformRegistry};
//!
//! let table = MappingTable::reference(&TransformRegistry::new())?;
//! let summary = BatchDriver::new(&table, BatchOptions::default())
//!     .run_files("starters.csv".as_ref(), "interface.csv".as_ref())?;
//! println!("{} rows, {} records", summary.rows, summary.records);
//! ```

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, error, info};

use crate::error::{PipelineError, PipelineResult};
use crate::parser::{CsvFormat, RecordWriter, RowReader};
use crate::transform::dsl::{transform_row, MappingTable};

/// How the transaction id (output position 2) is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionIdPolicy {
    /// Every record carries an empty transaction id.
    #[default]
    Empty,
    /// Rows are numbered from 1; all records of a row share its number.
    Counter,
}

impl TransactionIdPolicy {
    /// Transaction id for the given 1-based row number.
    pub fn id_for(&self, row_number: u64) -> String {
        match self {
            TransactionIdPolicy::Empty => String::new(),
            TransactionIdPolicy::Counter => row_number.to_string(),
        }
    }
}

/// Options for a batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Input/output file shape
    pub format: CsvFormat,

    /// Transaction id assignment
    pub transaction_ids: TransactionIdPolicy,
}

/// Counts from a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Input rows read
    pub rows: u64,
    /// Output records written
    pub records: u64,
}

/// Runs a mapping table over a whole input.
pub struct BatchDriver<'a> {
    table: &'a MappingTable,
    options: BatchOptions,
}

impl<'a> BatchDriver<'a> {
    pub fn new(table: &'a MappingTable, options: BatchOptions) -> Self {
        Self { table, options }
    }

    /// Convert every row of `input`, writing records to `output`.
    ///
    /// Stops at the first failing row. Records of earlier rows have already
    /// been written; none of the failing row's records are.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W) -> PipelineResult<BatchSummary> {
        self.convert(
            RowReader::new(input, &self.options.format),
            RecordWriter::new(output, &self.options.format),
        )
    }

    /// Convert `input` into `output`, creating or truncating the output file.
    ///
    /// The input is opened first, so a missing input leaves no output file behind.
    pub fn run_files(&self, input: &Path, output: &Path) -> PipelineResult<BatchSummary> {
        info!(
            input = %input.display(),
            output = %output.display(),
            templates = self.table.len(),
            transaction_ids = ?self.options.transaction_ids,
            "Starting batch"
        );

        let reader = RowReader::from_path(input, &self.options.format)?;
        let writer = RecordWriter::from_path(output, &self.options.format)?;
        let summary = self.convert(reader, writer)?;

        info!(rows = summary.rows, records = summary.records, "Batch complete");
        Ok(summary)
    }

    fn convert<R: Read, W: Write>(
        &self,
        mut reader: RowReader<R>,
        mut writer: RecordWriter<W>,
    ) -> PipelineResult<BatchSummary> {
        let mut summary = BatchSummary::default();

        while let Some(row) = reader.next_row()? {
            let row_number = summary.rows + 1;
            let transaction_id = self.options.transaction_ids.id_for(row_number);

            let records = transform_row(self.table, &row, &transaction_id).map_err(|source| {
                error!(row = row_number, error = %source, "Row failed, aborting run");
                PipelineError::Row {
                    row: row_number,
                    source,
                }
            })?;

            for record in &records {
                writer.write(record)?;
            }

            debug!(row = row_number, columns = row.len(), records = records.len(), "Row converted");
            summary.rows = row_number;
            summary.records += records.len() as u64;
        }

        writer.flush()?;
        Ok(summary)
    }
}
