//! Row-level domain models.
//!
//! - [`InputRow`] - one line of the source extract, cells addressed by 0-based index
//! - [`OutputRecord`] - one line of the interface file

use std::ops::Deref;

// =============================================================================
// InputRow
// =============================================================================

/// One row of the new starter extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow(Vec<String>);

impl InputRow {
    /// Cell at a 0-based column index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for InputRow {
    fn from(cells: Vec<String>) -> Self {
        Self(cells)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for InputRow {
    fn from(cells: [S; N]) -> Self {
        Self(cells.into_iter().map(Into::into).collect())
    }
}

impl From<&csv::StringRecord> for InputRow {
    fn from(record: &csv::StringRecord) -> Self {
        Self(record.iter().map(str::to_string).collect())
    }
}

// =============================================================================
// OutputRecord
// =============================================================================

/// One interface line: `[record_type, transaction_id, value_3, value_4, ...]`.
///
/// Cell `n` (0-based) is output position `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord(Vec<String>);

impl OutputRecord {
    /// Start a line holding only the two reserved positions.
    pub fn new(record_type: &str, transaction_id: &str) -> Self {
        Self(vec![record_type.to_string(), transaction_id.to_string()])
    }

    /// The 1-based position the next pushed value will occupy.
    pub fn next_position(&self) -> usize {
        self.0.len() + 1
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.0.push(value.into());
    }

    pub fn record_type(&self) -> &str {
        &self.0[0]
    }

    pub fn transaction_id(&self) -> &str {
        &self.0[1]
    }

    /// Value at a 1-based output position.
    pub fn at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .map(String::as_str)
    }
}

impl Deref for OutputRecord {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

// =============================================================================
// Tests
// =============================================================================
