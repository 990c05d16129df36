//! Integration tests for command-line intake

use crudsmith::scaffold::{EntityInput, EntitySchema, FieldType};
use crudsmith::{RunRecord, RunStore, ScaffoldOptions};
use crudsmith_cli_lib::commands::list::render_runs;
use crudsmith_cli_lib::commands::next_steps;
use crudsmith_cli_lib::parse_field_spec;
use tempfile::TempDir;

fn client_input() -> EntityInput {
    EntityInput {
        model_name: "Client".into(),
        table_name: "clients".into(),
        short_name: "clients".into(),
        fields: ["name:short_text", "owner_id:foreign:users:User:email", "size:bogus"]
            .into_iter()
            .map(|spec| parse_field_spec(spec).unwrap())
            .collect(),
        ..EntityInput::default()
    }
}

/// Parsed specs build a valid schema
#[test]
fn test_specs_build_schema() {
    let schema = EntitySchema::build(&client_input()).unwrap();

    assert_eq!(schema.fields().len(), 3);
    assert_eq!(schema.fields()[1].field_type, FieldType::Foreign);
    assert_eq!(schema.fields()[1].related_table.as_deref(), Some("users"));
    assert_eq!(schema.fields()[2].field_type, FieldType::ShortText);
}

/// A generated run shows up in the listing
#[test]
fn test_generated_run_is_listed() {
    let temp_dir = TempDir::new().unwrap();
    let store = RunStore::new(temp_dir.path());
    let outcome = store
        .generate(&client_input(), None, &ScaffoldOptions::default())
        .unwrap();

    let runs = store.list();
    assert_eq!(runs.len(), 1);

    let table = render_runs(&runs);
    assert!(table.contains("Client"));
    assert!(table.contains("clients"));
    assert!(table.contains(&outcome.run_dir.display().to_string()));
}

/// Wiring hints name the generated modules
#[test]
fn test_next_steps() {
    let schema = EntitySchema::build(&client_input()).unwrap();
    let record = RunRecord::from_schema(&schema, crudsmith::GenerationMode::Standard);
    let steps = next_steps(&record);

    assert!(steps.iter().any(|step| step.starts_with("pub mod client;")));
    assert!(steps.iter().any(|step| step.contains("routes::clients::routes()")));
}
