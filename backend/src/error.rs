//! Error types for the starterfeed formatter.
//!
//! One enum per layer, wrapped by a top-level [`PipelineError`]:
//!
//! - [`ConfigurationError`] - the mapping table is structurally invalid
//! - [`FieldResolutionError`] - a field references a column the row lacks
//! - [`TransformError`] - a transform function failed for a row
//! - [`ResolveError`] - either of the two above, raised per field
//! - [`CsvError`] - reading or writing delimited text failed
//! - [`UsageError`] - the command line was malformed
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors detected while building a mapping table, before any row is read.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A field sits at or before the position of the field declared before it.
    #[error(
        "Record '{record_type}': field '{field}' at position {position} must come after position {previous}"
    )]
    NonIncreasingPosition {
        record_type: String,
        field: String,
        position: usize,
        previous: usize,
    },

    /// Positions 1 and 2 hold the record type and transaction id.
    #[error("Record '{record_type}': field '{field}' uses reserved position {position} (fields start at 3)")]
    ReservedPosition {
        record_type: String,
        field: String,
        position: usize,
    },

    /// A transform names a function the registry does not know.
    #[error("Record '{record_type}': field '{field}' uses unknown function '{function}'")]
    UnknownFunction {
        record_type: String,
        field: String,
        function: String,
    },

    /// A transform passes the wrong number of positions to its function.
    #[error("Record '{record_type}': field '{field}' passes {given} position(s) to '{function}', which expects {expected}")]
    Arity {
        record_type: String,
        field: String,
        function: String,
        expected: String,
        given: usize,
    },

    /// Failed to read the mapping file.
    #[error("Failed to read mapping file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed definition or unknown value source kind.
    #[error("Invalid mapping definition: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Resolution Errors
// =============================================================================

/// A column index falls outside the row being resolved.
#[derive(Debug, Clone, Error)]
#[error(
    "Record '{record_type}': field '{field}' reads column {index} but the row has {row_len} column(s)"
)]
pub struct FieldResolutionError {
    pub record_type: String,
    pub field: String,
    pub index: usize,
    pub row_len: usize,
}

/// Failure reported by a transform function itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The function was handed fewer positions than it reads.
    #[error("expected an argument at position {0}")]
    MissingArgument(usize),

    /// The column value cannot be transformed.
    #[error("invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },
}

/// A transform function failed while resolving a field.
#[derive(Debug, Clone, Error)]
#[error("Record '{record_type}': function '{function}' failed on field '{field}': {source}")]
pub struct TransformError {
    pub record_type: String,
    pub field: String,
    pub function: String,
    #[source]
    pub source: OperationError,
}

/// Errors raised while resolving one field of one row.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error(transparent)]
    FieldResolution(#[from] FieldResolutionError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading input rows or writing output records.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to open or create a file.
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The given 1-based input row could not be read.
    #[error("Row {row}: unreadable input: {source}")]
    Read {
        row: u64,
        #[source]
        source: csv::Error,
    },

    /// A failed write.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to flush output.
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by the batch driver.
///
/// The first error aborts the run; output written for earlier rows stays in
/// place and must not be treated as a complete file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Mapping table error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Reading or writing delimited text failed.
    #[error("{0}")]
    Csv(#[from] CsvError),

    /// A field of the given 1-based input row could not be resolved.
    #[error("Row {row}: {source}")]
    Row {
        row: u64,
        #[source]
        source: ResolveError,
    },
}

// =============================================================================
// Usage Errors
// =============================================================================

/// The command line did not match the expected invocation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for mapping table construction.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Result type for field resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type for transform functions.
pub type OperationResult = Result<String, OperationError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
