//! Field type registry listing

use super::INFO;
use anyhow::Result;
use console::style;
use crudsmith::scaffold::FieldType;
use crudsmith::{CrudsmithConfig, DatabaseBackend};
use std::fmt::Write;

/// Show the field type registry
pub struct TypesCommand;

impl TypesCommand {
    /// Execute the types command
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the other commands.
    pub fn execute(config: &CrudsmithConfig) -> Result<()> {
        println!(
            "\n{} Field types ({})",
            INFO,
            style(config.database.backend).cyan()
        );
        println!();
        print!("{}", render_types(config.database.backend));
        Ok(())
    }
}

/// Plain-text table of the registry for `backend`
#[must_use]
pub fn render_types(backend: DatabaseBackend) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<12} {:<14} {:<18} Display",
        "Type", "Label", "SQL", "Control"
    );
    let _ = writeln!(out, "{}", "─".repeat(74));

    for field_type in FieldType::ALL {
        let mapping = field_type.mapping();
        let _ = writeln!(
            out,
            "{:<12} {:<12} {:<14} {:<18} {}",
            field_type.as_str(),
            field_type.label(),
            mapping.column.sql_type(backend),
            mapping.control.as_str(),
            mapping.display.as_str()
        );
    }

    out
}
