//! Position-mapping DSL for new starter rows
//!
//! This module provides:
//! - `matrix`: Mapping table definition (what the mapping file declares)
//! - `operations`: Transform functions usable as value sources
//! - `executor`: Walk a mapping table over one input row
//!
//! ## Usage Flow
//!
//! ```text
//! mapping JSON → MappingDefinition → MappingTable::from_definition → transform_row → OutputRecords
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use starterfeed::{transform_row, InputRow, MappingTable, TransformRegistry};
//!
//! let registry = TransformRegistry::new();
//! let table = MappingTable::reference(&registry)?;
//!
//! let row = InputRow::from(["Jane", "Smith", "01/02/2013"]);
//! for record in transform_row(&table, &row, "")? {
//!     println!("{:?}", record);
//! }
//! ```

pub mod executor;
pub mod matrix;
pub mod operations;

// Re-exports for convenience
pub use executor::{resolve, transform_record, transform_row};
pub use matrix::{
    FieldDefinition, FieldSpec, MappingDefinition, MappingTable, RecordDefinition, RecordTemplate,
    SourceDefinition, ValueSource, FIRST_FIELD_POSITION,
};
pub use operations::{Arity, Operation, TransformFn, TransformRegistry};
