//! # Starterfeed - New starter extract to HR interface records
//!
//! Starterfeed reads a flat CSV extract of new starters and writes, for every
//! row, the fixed-layout records the HR interface loads (employee flag,
//! personal details, additional details, relation, bank, basic employment).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Input CSV  │────▶│  RowReader  │────▶│  Executor   │────▶│ RecordWriter│
//! │ (1 row/emp) │     │ (streaming) │     │ (mapping)   │     │ (N rec/row) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The mapping table decides everything about the output layout; the
//! executor only walks it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starterfeed::{transform_row, InputRow, MappingTable, TransformRegistry};
//!
//! let table = MappingTable::reference(&TransformRegistry::new())?;
//! let records = transform_row(&table, &InputRow::from(["Jane", "Smith", "01/02/2013"]), "")?;
//! assert_eq!(records.len(), 6);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Input rows and output records
//! - [`parser`] - Streaming CSV reading and writing
//! - [`transform`] - Mapping DSL and batch driver
//! - [`logging`] - Diagnostics log setup

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Diagnostics
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigurationError, CsvError, FieldResolutionError, OperationError, PipelineError,
    ResolveError, TransformError, UsageError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{InputRow, OutputRecord};

// =============================================================================
// Re-exports - CSV
// =============================================================================

pub use parser::{CsvFormat, LineEnding, RecordWriter, RowReader};

// =============================================================================
// Re-exports - DSL
// =============================================================================

pub use transform::dsl::{
    resolve, transform_record, transform_row, Arity, FieldDefinition, FieldSpec,
    MappingDefinition, MappingTable, Operation, RecordDefinition, RecordTemplate,
    SourceDefinition, TransformFn, TransformRegistry, ValueSource, FIRST_FIELD_POSITION,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{BatchDriver, BatchOptions, BatchSummary, TransactionIdPolicy};

// =============================================================================
// Re-exports - Logging
// =============================================================================

pub use logging::{init_logging, LogConfig};
