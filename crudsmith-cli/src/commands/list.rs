//! Recorded runs

use super::INFO;
use anyhow::Result;
use console::style;
use crudsmith::{CrudsmithConfig, RunStore, StoredRun};
use std::fmt::Write;

/// List recorded runs, newest first
pub struct ListCommand;

impl ListCommand {
    /// Execute the list command
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the other commands.
    pub fn execute(config: &CrudsmithConfig) -> Result<()> {
        let store = RunStore::from_config(config);
        let runs = store.list();

        println!(
            "\n{} Runs in {}",
            INFO,
            style(store.root().display()).cyan()
        );
        println!();

        if runs.is_empty() {
            println!("  {}", style("(No runs recorded)").dim());
            return Ok(());
        }

        print!("{}", render_runs(&runs));
        Ok(())
    }
}

/// Plain-text table of runs
#[must_use]
pub fn render_runs(runs: &[StoredRun]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<16} {:<20} {:<14} {:<19} Directory",
        "Model", "Table", "Title", "Short name", "Created"
    );
    let _ = writeln!(out, "{}", "─".repeat(100));

    for run in runs {
        let record = &run.record;
        let _ = writeln!(
            out,
            "{:<16} {:<16} {:<20} {:<14} {:<19} {}",
            record.model_name,
            record.table_name,
            record.entity_display_title,
            record.entity_short_name,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.dir.display()
        );
    }

    out
}
