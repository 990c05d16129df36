//! End-to-end generation scenarios

use chrono::{NaiveDate, NaiveDateTime};
use crudsmith::scaffold::{
    generate_model_descriptor, generate_storage_schema, generate_views, EntityInput, EntitySchema,
    FieldInput, ScaffoldGenerator, ViewKind,
};
use crudsmith::{GenerationMode, RunRecord, ScaffoldOptions, ValidationError};

fn created_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .and_then(|date| date.and_hms_opt(14, 30, 0))
        .unwrap()
}

fn client_input() -> EntityInput {
    EntityInput {
        model_name: "Client".into(),
        table_name: "clients".into(),
        short_name: "clients".into(),
        fields: vec![
            FieldInput::new("name", "short_text"),
            FieldInput {
                related_table: Some("users".into()),
                related_model: Some("User".into()),
                display_column: Some("email".into()),
                ..FieldInput::new("owner_id", "foreign")
            },
        ],
        ..EntityInput::default()
    }
}

fn client() -> EntitySchema {
    EntitySchema::build_at(&client_input(), created_at()).unwrap()
}

/// Storage, model and show page of the Client scenario
#[test]
fn test_client_scenario() {
    let schema = client();

    let storage = generate_storage_schema(&schema);
    assert_eq!(
        storage.column_names(),
        ["id", "name", "owner_id", "created_at", "updated_at"]
    );
    assert_eq!(storage.constraints.len(), 1);
    assert_eq!(storage.constraints[0].column, "owner_id");
    assert_eq!(storage.constraints[0].references_table, "users");

    let model = generate_model_descriptor(&schema);
    assert_eq!(model.fillable, ["name", "owner_id"]);
    assert!(model.relation("ownerIdRelation").is_some());

    let views = generate_views(&schema, GenerationMode::Standard);
    let show = views.get(ViewKind::Show).unwrap();
    assert!(show
        .fields
        .iter()
        .any(|field| field.display.contains("item.ownerIdRelation.email")));
}

/// One-page mode: a single list page with both dialogs
#[test]
fn test_client_scenario_one_page() {
    let views = generate_views(&client(), GenerationMode::OnePage);
    assert_eq!(views.len(), 1);

    let list = views.get(ViewKind::List).unwrap();
    assert!(list.create_dialog().is_some());
    assert!(list.edit_dialog().is_some());
    assert!(views.get(ViewKind::Show).is_none());

    let artifacts = ScaffoldGenerator::new(client(), GenerationMode::OnePage, ScaffoldOptions::default())
        .unwrap()
        .generate()
        .unwrap();
    assert_eq!(artifacts.len(), 5);
}

/// An unknown type degrades to short text everywhere
#[test]
fn test_bogus_type() {
    let schema = EntitySchema::build_at(
        &EntityInput {
            fields: vec![FieldInput::new("size", "bogus")],
            ..client_input()
        },
        created_at(),
    )
    .unwrap();

    let storage = generate_storage_schema(&schema);
    let column = storage.column("size").unwrap();
    assert_eq!(
        column.definition(crudsmith::DatabaseBackend::Postgres),
        "size VARCHAR(191) NOT NULL"
    );

    let views = generate_views(&schema, GenerationMode::Standard);
    let create = views.get(ViewKind::Create).unwrap().form().unwrap();
    assert!(create.controls[0].contains(r#"type="text""#));
    let list = views.get(ViewKind::List).unwrap();
    assert_eq!(list.fields[0].display, "{{ item.size }}");
}

/// Incomplete rows are dropped before validation
#[test]
fn test_dropped_rows() {
    let schema = EntitySchema::build(&EntityInput {
        fields: vec![
            FieldInput::new("a", "short_text"),
            FieldInput::new("", "integer"),
        ],
        ..client_input()
    })
    .unwrap();

    assert_eq!(schema.fields().len(), 1);
    assert_eq!(schema.fields()[0].column_name, "a");
}

/// Nothing to generate without fields
#[test]
fn test_no_fields() {
    let err = EntitySchema::build(&EntityInput {
        fields: vec![FieldInput::new("", "")],
        ..client_input()
    })
    .unwrap_err();
    assert_eq!(err, ValidationError::NoFields);
}

/// The run record reproduces the schema it was written from
#[test]
fn test_run_record_round_trip() {
    let schema = client();
    let record = RunRecord::from_schema(&schema, GenerationMode::OnePage);

    let json = serde_json::to_string_pretty(&record).unwrap();
    let parsed: RunRecord = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.to_schema().unwrap(), schema);
    assert_eq!(parsed.mode(), GenerationMode::OnePage);
}

/// Two generations of the same schema are byte-identical
#[test]
fn test_generation_into_fresh_locations_is_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    for dir in [&first, &second] {
        ScaffoldGenerator::new(client(), GenerationMode::Standard, ScaffoldOptions::default())
            .unwrap()
            .write_to(dir.path())
            .unwrap();
    }

    let files: Vec<_> = walkdir::WalkDir::new(first.path())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .collect();
    assert_eq!(files.len(), 8);

    for entry in files {
        let relative = entry.path().strip_prefix(first.path()).unwrap();
        let a = std::fs::read(entry.path()).unwrap();
        let b = std::fs::read(second.path().join(relative)).unwrap();
        assert_eq!(a, b, "{}", relative.display());
    }
}
