//! CRUD scaffold generation
//!
//! # Example
//!
//! ```bash
//! crudsmith generate --model Client --table clients --short-name clients \
//!   name:short_text \
//!   owner_id:foreign:users:User:email \
//!   notes:rich_text \
//!   active:boolean
//! ```
//!
//! A JSON intake file (`--input`) supplies the same description; flags and
//! positional fields given alongside it override or extend it.

use crate::field_spec::parse_field_spec;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use crudsmith::scaffold::{EntityInput, FieldInput};
use crudsmith::{CrudsmithConfig, RunStore};
use std::fs;
use std::path::PathBuf;

/// Generate a CRUD scaffold and record the run
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Model name (e.g. `Client`)
    #[arg(long, required_unless_present = "input")]
    pub model: Option<String>,

    /// Backing table (e.g. `clients`)
    #[arg(long, required_unless_present = "input")]
    pub table: Option<String>,

    /// URL and route-name prefix (e.g. `clients`)
    #[arg(long, required_unless_present = "input")]
    pub short_name: Option<String>,

    /// Title used in pages and messages (default: derived from the model)
    #[arg(long)]
    pub title: Option<String>,

    /// One list page with create and edit dialogs
    #[arg(long)]
    pub one_page: bool,

    /// Write artifacts here instead of the run directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON intake file
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Fields as `column:type[:related_table:related_model:display_column]`
    #[arg(value_parser = parse_field_spec, required_unless_present = "input")]
    pub fields: Vec<FieldInput>,
}

impl GenerateCommand {
    /// Execute the generate command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The intake file cannot be read or parsed
    /// - The entity description is invalid
    /// - Rendering or writing the artifacts fails
    pub fn execute(&self, config: &CrudsmithConfig) -> Result<()> {
        let input = self.build_input()?;

        println!(
            "\n{} {} {}",
            style("Scaffolding CRUD for").cyan().bold(),
            style(&input.model_name).green().bold(),
            style("...").cyan().bold()
        );

        let outcome = RunStore::from_config(config)
            .generate(&input, self.output.as_deref(), &config.scaffold_options())
            .context("Failed to generate scaffold")?;

        super::report(&outcome);

        Ok(())
    }

    /// Entity description from the intake file and flags
    ///
    /// # Errors
    ///
    /// Returns an error if the intake file cannot be read or parsed.
    pub fn build_input(&self) -> Result<EntityInput> {
        let mut input = match &self.input {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read intake file: {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse intake file: {}", path.display()))?
            }
            None => EntityInput::default(),
        };

        if let Some(model) = &self.model {
            input.model_name.clone_from(model);
        }
        if let Some(table) = &self.table {
            input.table_name.clone_from(table);
        }
        if let Some(short_name) = &self.short_name {
            input.short_name.clone_from(short_name);
        }
        if let Some(title) = &self.title {
            input.display_title.clone_from(title);
        }
        input.one_page |= self.one_page;
        input.fields.extend(self.fields.iter().cloned());

        tracing::debug!(
            model = %input.model_name,
            fields = input.fields.len(),
            one_page = input.one_page,
            "intake assembled"
        );

        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        command: GenerateCommand,
    }

    fn parse(args: &[&str]) -> GenerateCommand {
        Harness::try_parse_from(std::iter::once("generate").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_flags_build_input() {
        let command = parse(&[
            "--model",
            "Client",
            "--table",
            "clients",
            "--short-name",
            "clients",
            "--one-page",
            "name:short_text",
            "owner_id:foreign:users:User:email",
        ]);

        let input = command.build_input().unwrap();
        assert_eq!(input.model_name, "Client");
        assert!(input.one_page);
        assert_eq!(input.fields.len(), 2);
        assert_eq!(input.fields[1].related_model.as_deref(), Some("User"));
    }

    #[test]
    fn test_flags_required_without_intake() {
        let result = Harness::try_parse_from(["generate", "name:short_text"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_field_spec_is_rejected() {
        let result = Harness::try_parse_from([
            "generate",
            "--model",
            "Client",
            "--table",
            "clients",
            "--short-name",
            "clients",
            "name",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_intake_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        fs::write(
            &path,
            r#"{
                "model_name": "Client",
                "table_name": "clients",
                "entity_short_name": "clients",
                "fields": [{"column_name": "name", "type": "short_text"}]
            }"#,
        )
        .unwrap();

        let command = parse(&[
            "--input",
            path.to_str().unwrap(),
            "--title",
            "Customer",
            "active:boolean",
        ]);
        let input = command.build_input().unwrap();

        assert_eq!(input.short_name, "clients");
        assert_eq!(input.display_title, "Customer");
        assert_eq!(input.fields.len(), 2);
        assert_eq!(input.fields[0].data_type.as_deref(), Some("short_text"));
    }
}
