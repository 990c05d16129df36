//! CLI command implementations

pub mod edit;
pub mod generate;
pub mod list;
pub mod types;

pub use edit::EditCommand;
pub use generate::GenerateCommand;
pub use list::ListCommand;
pub use types::TypesCommand;

use console::{style, Emoji};
use crudsmith::scaffold::TemplateHelpers;
use crudsmith::{RunOutcome, RunRecord};

pub(crate) static SUCCESS: Emoji = Emoji("✓", "√");
pub(crate) static INFO: Emoji = Emoji("ℹ", "i");

/// Print the files of a finished run and the wiring left to do by hand
pub(crate) fn report(outcome: &RunOutcome) {
    println!(
        "\n{} {} files in {}:",
        style("Generated").green().bold(),
        outcome.written.len(),
        style(outcome.output_dir.display()).cyan()
    );

    for path in &outcome.written {
        let shown = path.strip_prefix(&outcome.output_dir).unwrap_or(path.as_path());
        println!("  {} {}", style(SUCCESS).green(), style(shown.display()).dim());
    }

    println!(
        "\n{} Run recorded in {}",
        INFO,
        style(outcome.run_dir.display()).cyan()
    );

    println!("\n{}", style("Next steps:").cyan().bold());
    for (index, step) in next_steps(&outcome.record).iter().enumerate() {
        println!("  {}. {}", index + 1, style(step).yellow());
    }
}

/// Manual wiring the generated files expect in the target application
#[must_use]
pub fn next_steps(record: &RunRecord) -> Vec<String> {
    let model = TemplateHelpers::to_module_name(&record.model_name);
    let handlers = TemplateHelpers::to_module_name(&record.entity_short_name);
    vec![
        "sqlx migrate run".to_string(),
        format!("pub mod {model};  // src/models/mod.rs"),
        format!("pub mod {handlers};  // src/handlers/mod.rs and src/routes/mod.rs"),
        format!(".merge(routes::{handlers}::routes())  // application router"),
    ]
}
