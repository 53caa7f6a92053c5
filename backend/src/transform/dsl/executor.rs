//! Mapping executor
//!
//! Walks a [`MappingTable`] over one input row to produce that row's
//! interface records. Resolution is pure: the same table, row and
//! transaction id always give the same records.

use super::matrix::{FieldSpec, MappingTable, RecordTemplate, ValueSource};
use crate::error::{FieldResolutionError, ResolveResult, TransformError};
use crate::models::{InputRow, OutputRecord};

/// Resolve one field's value for a row.
///
/// `record_type` is only used to label errors.
pub fn resolve(field: &FieldSpec, record_type: &str, row: &InputRow) -> ResolveResult<String> {
    let out_of_range = |index: usize| FieldResolutionError {
        record_type: record_type.to_string(),
        field: field.name.clone(),
        index,
        row_len: row.len(),
    };

    match &field.source {
        ValueSource::Literal(value) => Ok(value.clone()),

        ValueSource::PositionRef(index) => row
            .get(*index)
            .map(str::to_string)
            .ok_or_else(|| out_of_range(*index).into()),

        ValueSource::Transform {
            name,
            function,
            positions,
        } => {
            if let Some(&index) = positions.iter().find(|&&i| i >= row.len()) {
                return Err(out_of_range(index).into());
            }
            (*function)(row, positions.as_slice()).map_err(|source| {
                TransformError {
                    record_type: record_type.to_string(),
                    field: field.name.clone(),
                    function: name.clone(),
                    source,
                }
                .into()
            })
        }
    }
}

/// Build the output line for one record template.
pub fn transform_record(
    template: &RecordTemplate,
    row: &InputRow,
    transaction_id: &str,
) -> ResolveResult<OutputRecord> {
    let mut record = OutputRecord::new(template.record_type(), transaction_id);

    for field in template.fields() {
        // Positions the template leaves out stay blank
        while record.next_position() < field.position {
            record.push("");
        }
        record.push(resolve(field, template.record_type(), row)?);
    }

    Ok(record)
}

/// Build every output line for one row, in table order.
///
/// Fails on the first field that cannot be resolved; no partial result is returned.
pub fn transform_row(
    table: &MappingTable,
    row: &InputRow,
    transaction_id: &str,
) -> ResolveResult<Vec<OutputRecord>> {
    table
        .templates()
        .iter()
        .map(|template| transform_record(template, row, transaction_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OperationError, OperationResult, ResolveError};
    use crate::transform::dsl::matrix::{FieldDefinition, MappingDefinition};
    use crate::transform::dsl::operations::{Arity, TransformRegistry};

    fn pick0(row: &InputRow, positions: &[usize]) -> OperationResult {
        Ok(row.cells()[positions[0]].clone())
    }

    fn concat(row: &InputRow, positions: &[usize]) -> OperationResult {
        Ok(positions.iter().map(|&i| row.cells()[i].as_str()).collect())
    }

    fn always_fails(row: &InputRow, positions: &[usize]) -> OperationResult {
        Err(OperationError::InvalidValue {
            value: row.cells()[positions[0]].clone(),
            reason: "rejected".to_string(),
        })
    }

    fn registry() -> TransformRegistry {
        let mut registry = TransformRegistry::empty();
        registry
            .register("pick0", Arity::exactly(1), pick0)
            .register("concat", Arity::at_least(1), concat)
            .register("always_fails", Arity::exactly(1), always_fails);
        registry
    }

    fn test_table() -> MappingTable {
        let definition = MappingDefinition::new()
            .with_record("TEST_STRING", vec![FieldDefinition::literal("test1", 3, "LITERAL")])
            .with_record("TEST_POSITION", vec![FieldDefinition::column("test2", 3, 3)])
            .with_record(
                "TEST_FUNCTION_ONE",
                vec![FieldDefinition::transform("test3", 4, "pick0", &[2])],
            )
            .with_record(
                "TEST_FUNCTION_TWO",
                vec![FieldDefinition::transform("test4", 5, "concat", &[3, 1])],
            )
            .with_record(
                "TEST_EVERYTHING",
                vec![
                    FieldDefinition::column("test5", 3, 1),
                    FieldDefinition::transform("test6", 4, "pick0", &[0]),
                    FieldDefinition::literal("test7", 6, "ANOTHER_LITERAL"),
                    FieldDefinition::transform("test8", 7, "concat", &[2, 5]),
                ],
            );
        MappingTable::from_definition(&definition, &registry()).unwrap()
    }

    fn test_row() -> InputRow {
        InputRow::from(["this", "is", "a", "test", "input", "row"])
    }

    fn cells(records: &[OutputRecord]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_transform_row_all_source_kinds() {
        let records = transform_row(&test_table(), &test_row(), "").unwrap();

        assert_eq!(
            cells(&records),
            vec![
                vec!["TEST_STRING", "", "LITERAL"],
                vec!["TEST_POSITION", "", "test"],
                vec!["TEST_FUNCTION_ONE", "", "", "a"],
                vec!["TEST_FUNCTION_TWO", "", "", "", "testis"],
                vec!["TEST_EVERYTHING", "", "is", "this", "", "ANOTHER_LITERAL", "arow"],
            ]
        );
    }

    #[test]
    fn test_transaction_id_in_second_position() {
        let records = transform_row(&test_table(), &test_row(), "42").unwrap();
        assert!(records.iter().all(|r| r.transaction_id() == "42"));
    }

    #[test]
    fn test_layout_independent_of_row_content() {
        let table = test_table();
        let a = transform_row(&table, &test_row(), "").unwrap();
        let b = transform_row(&table, &InputRow::from(["1", "2", "3", "4", "5", "6"]), "").unwrap();

        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.len(), y.len());
            assert_eq!(x.record_type(), y.record_type());
        }
        // Literals and gaps do not move with the data
        assert_eq!(a[4].at(6), b[4].at(6));
        assert_eq!(b[4].at(5), Some(""));
        assert_eq!(b[1].at(3), Some("4"));
    }

    #[test]
    fn test_empty_template_and_empty_table() {
        let definition = MappingDefinition::new().with_record("30BANK", vec![]);
        let table = MappingTable::from_definition(&definition, &registry()).unwrap();
        let records = transform_row(&table, &test_row(), "7").unwrap();
        assert_eq!(cells(&records), vec![vec!["30BANK", "7"]]);

        let records = transform_row(&MappingTable::default(), &test_row(), "").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_position_ref_out_of_range() {
        let definition = MappingDefinition::new()
            .with_record("10PERDET", vec![FieldDefinition::column("surname", 7, 9)]);
        let table = MappingTable::from_definition(&definition, &registry()).unwrap();

        let err = transform_row(&table, &test_row(), "").unwrap_err();
        match err {
            ResolveError::FieldResolution(e) => {
                assert_eq!(e.record_type, "10PERDET");
                assert_eq!(e.field, "surname");
                assert_eq!(e.index, 9);
                assert_eq!(e.row_len, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transform_index_out_of_range() {
        let definition = MappingDefinition::new()
            .with_record("X", vec![FieldDefinition::transform("joined", 3, "concat", &[0, 6])]);
        let table = MappingTable::from_definition(&definition, &registry()).unwrap();

        let err = transform_row(&table, &test_row(), "").unwrap_err();
        assert!(matches!(err, ResolveError::FieldResolution(ref e) if e.index == 6));
    }

    #[test]
    fn test_transform_failure_is_labelled() {
        let definition = MappingDefinition::new().with_record(
            "35EMPBASIC",
            vec![FieldDefinition::transform("start", 6, "always_fails", &[2])],
        );
        let table = MappingTable::from_definition(&definition, &registry()).unwrap();

        let err = transform_row(&table, &test_row(), "").unwrap_err();
        match err {
            ResolveError::Transform(e) => {
                assert_eq!(e.record_type, "35EMPBASIC");
                assert_eq!(e.field, "start");
                assert_eq!(e.function, "always_fails");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reference_table_with_builtins() {
        let table = MappingTable::reference(&TransformRegistry::new()).unwrap();
        let row = InputRow::from(["Jane", "Smith", "01/02/2013"]);
        let records = transform_row(&table, &row, "").unwrap();

        let widths: Vec<usize> = records.iter().map(|r| r.len()).collect();
        assert_eq!(widths, vec![6, 43, 22, 25, 6, 12]);

        assert_eq!(records[0].at(6), Some("Y"));
        assert_eq!(records[1].at(7), Some("Smith"));
        assert_eq!(records[1].at(8), Some("Jane"));
        assert_eq!(records[5].at(6), Some("01022013"));

        // Everything else past the reserved slots is blank
        let filled = [(0, 6), (1, 7), (1, 8), (5, 6)];
        for (i, record) in records.iter().enumerate() {
            for position in 3..=record.len() {
                if !filled.contains(&(i, position)) {
                    let label = format!("{} @{}", record.record_type(), position);
                    assert_eq!(record.at(position), Some(""), "{label}");
                }
            }
        }
    }
}
