//! entity-store-cli: compile schema documents to SQL and inspect generated stores

use anyhow::Result;
use clap::{Parser, Subcommand};
use entity_store_sdk::cli::CliError;
use entity_store_sdk::cli::commands::{inspect, sql, validate};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "entity-store-cli")]
#[command(about = "Compile data formats and relations to SQL and inspect the generated stores")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the DDL script of a schema
    Sql {
        /// Schema document (YAML or JSON), '-' for stdin
        input: String,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the drop script instead
        #[arg(long)]
        drop: bool,
    },
    /// Print relation names and store function names
    Inspect {
        /// Schema document (YAML or JSON), '-' for stdin
        input: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Only show the store of this data format
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Validate a schema document
    Validate {
        /// Schema document (YAML or JSON), '-' for stdin
        input: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Sql {
            input,
            config,
            drop,
        } => sql::handle_sql(&input, config.as_deref(), drop),
        Command::Inspect {
            input,
            config,
            format,
        } => inspect::handle_inspect(&input, config.as_deref(), format.as_deref()),
        Command::Validate { input, config } => validate::handle_validate(&input, config.as_deref()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("{}", error.user_message());
        std::process::exit(1);
    }
    Ok(())
}
