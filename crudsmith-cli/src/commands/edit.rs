//! Edit and regenerate a recorded run
//!
//! # Example
//!
//! ```bash
//! # Retitle, retype `notes`, add `active` and drop `owner_id`
//! crudsmith edit "projects/Client - clients 20240305_143000" \
//!   --title Customer --remove owner_id \
//!   notes:long_text active:boolean
//! ```

use crate::field_spec::parse_field_spec;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use crudsmith::scaffold::FieldInput;
use crudsmith::{CrudsmithConfig, GenerationMode, RunAmendment, RunStore};
use dialoguer::Confirm;
use std::path::PathBuf;

/// Edit a recorded run and generate it again, optionally in the other mode or elsewhere
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Run directory holding `entity_config.json`
    pub run_dir: PathBuf,

    /// Regenerate as one list page with dialogs
    #[arg(long, conflicts_with = "standard")]
    pub one_page: bool,

    /// Regenerate as separate list, create, edit and show pages
    #[arg(long)]
    pub standard: bool,

    /// Write artifacts here instead of the run directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Replace the display title
    #[arg(long)]
    pub title: Option<String>,

    /// Drop a column (repeatable)
    #[arg(long, value_name = "COLUMN")]
    pub remove: Vec<String>,

    /// Fields to add, or to replace when the column already exists
    #[arg(value_parser = parse_field_spec)]
    pub fields: Vec<FieldInput>,
}

impl EditCommand {
    /// Mode requested on the command line, if any
    #[must_use]
    pub const fn mode(&self) -> Option<GenerationMode> {
        if self.one_page {
            Some(GenerationMode::OnePage)
        } else if self.standard {
            Some(GenerationMode::Standard)
        } else {
            None
        }
    }

    /// Changes requested on the command line
    #[must_use]
    pub fn amendment(&self) -> RunAmendment {
        RunAmendment {
            display_title: self.title.clone(),
            fields: self.fields.clone(),
            remove: self.remove.clone(),
        }
    }

    /// Execute the edit command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The run directory holds no readable record
    /// - The amended description is invalid
    /// - The confirmation prompt cannot be shown
    /// - Rendering or writing the artifacts fails
    pub fn execute(&self, config: &CrudsmithConfig) -> Result<()> {
        let record = RunStore::load(&self.run_dir)
            .with_context(|| format!("Failed to load run: {}", self.run_dir.display()))?;
        let amendment = self.amendment();
        let mode = self.mode().unwrap_or_else(|| record.mode());
        let target = self.output.as_ref().unwrap_or(&self.run_dir);

        println!(
            "\n{} {} ({}, {} fields, {} mode)",
            style("Regenerating").cyan().bold(),
            style(&record.model_name).green().bold(),
            record.table_name,
            record.fields.len(),
            mode
        );
        if !amendment.is_empty() {
            println!(
                "  {} {} added or replaced, {} removed{}",
                style("Amending:").yellow(),
                amendment.fields.len(),
                amendment.remove.len(),
                amendment
                    .display_title
                    .as_deref()
                    .map_or_else(String::new, |title| format!(", title \"{title}\""))
            );
        }

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Overwrite generated files in {}?",
                    target.display()
                ))
                .default(false)
                .interact()
                .context("Failed to read confirmation")?;

            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }
        }

        let outcome = RunStore::from_config(config)
            .amend(
                &self.run_dir,
                &amendment,
                self.mode(),
                self.output.as_deref(),
                &config.scaffold_options(),
            )
            .context("Failed to regenerate scaffold")?;

        super::report(&outcome);

        Ok(())
    }
}
