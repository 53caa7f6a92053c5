//! Mapping table definition
//!
//! The mapping table defines every interface line produced from one input row:
//! which record types are emitted, in which order, and how each output
//! position gets its value.
//!
//! Two forms exist:
//! - [`MappingDefinition`] is the serialized (JSON) form, as written in a mapping file.
//! - [`MappingTable`] is the validated, immutable form the executor walks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use super::operations::{TransformFn, TransformRegistry};
use crate::error::{ConfigResult, ConfigurationError};

/// First output position a field may occupy; 1 and 2 are record type and transaction id.
pub const FIRST_FIELD_POSITION: usize = 3;

/// Mapping of the six-record new starter layout, used when no mapping file is given.
const REFERENCE_TABLE_JSON: &str = include_str!("../../../mappings/new_starter.json");

// =============================================================================
// Validated table
// =============================================================================

/// How one output field gets its value.
#[derive(Clone)]
pub enum ValueSource {
    /// Fixed text, independent of the row.
    Literal(String),
    /// Copy of the input cell at a 0-based column index.
    PositionRef(usize),
    /// Result of a transform function over the listed columns.
    Transform {
        name: String,
        function: TransformFn,
        positions: Vec<usize>,
    },
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ValueSource::PositionRef(index) => f.debug_tuple("PositionRef").field(index).finish(),
            ValueSource::Transform { name, positions, .. } => f
                .debug_struct("Transform")
                .field("name", name)
                .field("positions", positions)
                .finish_non_exhaustive(),
        }
    }
}

/// One output field: where it goes and where its value comes from.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Documentation only; used in diagnostics.
    pub name: String,
    /// 1-based output position, always >= [`FIRST_FIELD_POSITION`].
    pub position: usize,
    pub source: ValueSource,
}

/// One output line layout.
#[derive(Debug, Clone)]
pub struct RecordTemplate {
    record_type: String,
    fields: Vec<FieldSpec>,
}

impl RecordTemplate {
    /// Build a template, checking positions are >= 3 and strictly increasing.
    pub fn new(record_type: impl Into<String>, fields: Vec<FieldSpec>) -> ConfigResult<Self> {
        let record_type = record_type.into();
        let mut previous: Option<usize> = None;

        for field in &fields {
            if field.position < FIRST_FIELD_POSITION {
                return Err(ConfigurationError::ReservedPosition {
                    record_type,
                    field: field.name.clone(),
                    position: field.position,
                });
            }
            if let Some(prev) = previous {
                if field.position <= prev {
                    return Err(ConfigurationError::NonIncreasingPosition {
                        record_type,
                        field: field.name.clone(),
                        position: field.position,
                        previous: prev,
                    });
                }
            }
            previous = Some(field.position);
        }

        Ok(Self { record_type, fields })
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Fields in increasing position order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// The complete, ordered output contract. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    templates: Vec<RecordTemplate>,
}

impl MappingTable {
    pub fn new(templates: Vec<RecordTemplate>) -> Self {
        Self { templates }
    }

    /// Validate a definition, resolving function names against `registry`.
    pub fn from_definition(
        definition: &MappingDefinition,
        registry: &TransformRegistry,
    ) -> ConfigResult<Self> {
        let templates = definition
            .records
            .iter()
            .map(|record| record.build(registry))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self::new(templates))
    }

    /// Parse and validate a JSON definition.
    pub fn from_json(json: &str, registry: &TransformRegistry) -> ConfigResult<Self> {
        Self::from_definition(&MappingDefinition::from_json(json)?, registry)
    }

    /// Read, parse and validate a JSON mapping file.
    pub fn from_file(path: impl AsRef<Path>, registry: &TransformRegistry) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content, registry)
    }

    /// The built-in new starter layout.
    pub fn reference(registry: &TransformRegistry) -> ConfigResult<Self> {
        Self::from_json(REFERENCE_TABLE_JSON, registry)
    }

    pub fn templates(&self) -> &[RecordTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// =============================================================================
// Serialized definition
// =============================================================================

/// A mapping file as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDefinition {
    /// Version of the mapping format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Output lines, in emission order
    #[serde(default)]
    pub records: Vec<RecordDefinition>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Serialized form of a [`RecordTemplate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDefinition {
    pub record_type: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Serialized form of a [`FieldSpec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub position: usize,
    pub source: SourceDefinition,
}

/// Serialized form of a [`ValueSource`]; transforms name their function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDefinition {
    Literal { value: String },
    Column { index: usize },
    Transform { function: String, positions: Vec<usize> },
}

impl MappingDefinition {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            description: String::new(),
            records: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Append a record layout.
    pub fn with_record(mut self, record_type: &str, fields: Vec<FieldDefinition>) -> Self {
        self.records.push(RecordDefinition {
            record_type: record_type.to_string(),
            fields,
        });
        self
    }
}

impl Default for MappingDefinition {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordDefinition {
    fn build(&self, registry: &TransformRegistry) -> ConfigResult<RecordTemplate> {
        let fields = self
            .fields
            .iter()
            .map(|field| field.build(&self.record_type, registry))
            .collect::<ConfigResult<Vec<_>>>()?;
        RecordTemplate::new(self.record_type.clone(), fields)
    }
}

impl FieldDefinition {
    pub fn literal(name: &str, position: usize, value: &str) -> Self {
        Self {
            name: name.to_string(),
            position,
            source: SourceDefinition::Literal {
                value: value.to_string(),
            },
        }
    }

    pub fn column(name: &str, position: usize, index: usize) -> Self {
        Self {
            name: name.to_string(),
            position,
            source: SourceDefinition::Column { index },
        }
    }

    pub fn transform(name: &str, position: usize, function: &str, positions: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            position,
            source: SourceDefinition::Transform {
                function: function.to_string(),
                positions: positions.to_vec(),
            },
        }
    }

    fn build(&self, record_type: &str, registry: &TransformRegistry) -> ConfigResult<FieldSpec> {
        let source = match &self.source {
            SourceDefinition::Literal { value } => ValueSource::Literal(value.clone()),
            SourceDefinition::Column { index } => ValueSource::PositionRef(*index),
            SourceDefinition::Transform { function, positions } => {
                let operation =
                    registry
                        .get(function)
                        .ok_or_else(|| ConfigurationError::UnknownFunction {
                            record_type: record_type.to_string(),
                            field: self.name.clone(),
                            function: function.clone(),
                        })?;
                if !operation.arity.accepts(positions.len()) {
                    return Err(ConfigurationError::Arity {
                        record_type: record_type.to_string(),
                        field: self.name.clone(),
                        function: function.clone(),
                        expected: operation.arity.to_string(),
                        given: positions.len(),
                    });
                }
                ValueSource::Transform {
                    name: function.clone(),
                    function: operation.function,
                    positions: positions.clone(),
                }
            }
        };

        Ok(FieldSpec {
            name: self.name.clone(),
            position: self.position,
            source,
        })
    }
}
