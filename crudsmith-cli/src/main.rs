//! crudsmith CLI tool

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use crudsmith::config::CONFIG_FILE;
use crudsmith::{observability, CrudsmithConfig};
use crudsmith_cli_lib::commands::{EditCommand, GenerateCommand, ListCommand, TypesCommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crudsmith")]
#[command(version)]
#[command(about = "CRUD scaffolding for axum + sqlx + HTMX applications", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a CRUD scaffold and record the run
    Generate(GenerateCommand),
    /// Regenerate a recorded run
    Edit(EditCommand),
    /// List recorded runs, newest first
    List,
    /// Show the field type registry
    Types,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    observability::init(observability::directive_for_verbosity(cli.verbose))
        .context("Failed to initialize logging")?;

    let config = CrudsmithConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration: {}", cli.config.display()))?;

    match cli.command {
        Commands::Generate(cmd) => cmd.execute(&config),
        Commands::Edit(cmd) => cmd.execute(&config),
        Commands::List => ListCommand::execute(&config),
        Commands::Types => TypesCommand::execute(&config),
    }
}
