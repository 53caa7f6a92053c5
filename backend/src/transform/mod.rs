//! Transformation module.
//!
//! This module handles new starter row to interface record conversion:
//! - DSL: Mapping table, transform functions and executor
//! - Pipeline: Batch driver over a whole extract

pub mod dsl;
pub mod pipeline;

pub use dsl::*;
pub use pipeline::*;
