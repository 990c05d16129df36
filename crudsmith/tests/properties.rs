//! Property tests over generated storage schemas

use crudsmith::scaffold::{generate_storage_schema, EntityInput, EntitySchema, FieldInput, FieldType};
use proptest::prelude::*;

fn field_type() -> impl Strategy<Value = FieldType> {
    prop::sample::select(FieldType::ALL.to_vec())
}

/// Field rows with unique column names; foreign rows may omit the table
fn field_rows() -> impl Strategy<Value = Vec<FieldInput>> {
    prop::collection::vec((field_type(), any::<bool>()), 1..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (field_type, with_table))| {
                let mut row = FieldInput::new(format!("field_{index}"), field_type.as_str());
                if field_type == FieldType::Foreign && with_table {
                    row.related_table = Some(format!("table_{index}"));
                    row.related_model = Some(format!("Model{index}"));
                }
                row
            })
            .collect()
    })
}

fn schema(fields: Vec<FieldInput>) -> EntitySchema {
    EntitySchema::build(&EntityInput {
        model_name: "Thing".into(),
        table_name: "things".into(),
        short_name: "things".into(),
        fields,
        ..EntityInput::default()
    })
    .unwrap()
}

proptest! {
    #[test]
    fn column_count_is_fields_plus_three(rows in field_rows()) {
        let count = rows.len();
        let storage = generate_storage_schema(&schema(rows));

        prop_assert_eq!(storage.columns.len(), count + 3);
        prop_assert_eq!(storage.non_identity_columns().count(), count + 2);
        prop_assert_eq!(storage.identity().map(|column| column.name.as_str()), Some("id"));
    }

    #[test]
    fn one_constraint_per_referenced_table(rows in field_rows()) {
        let expected: Vec<(String, String)> = rows
            .iter()
            .filter_map(|row| Some((row.column_name.clone()?, row.related_table.clone()?)))
            .collect();
        let storage = generate_storage_schema(&schema(rows));

        let actual: Vec<(String, String)> = storage
            .constraints
            .iter()
            .map(|constraint| (constraint.column.clone(), constraint.references_table.clone()))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
