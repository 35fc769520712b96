//! Command-line interface for loading point-of-interest exports into SQLite.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod import;

pub use error::CliError;

use import::{ImportArgs, run_import};

pub(crate) const ARG_FILE: &str = "file";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_BATCH_SIZE: &str = "batch-size";
pub(crate) const ENV_FILES: &str = "POILOAD_CMDS_IMPORT_FILES";

/// Run the poiload CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => run_import(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "poiload",
    about = "Load point-of-interest exports into a SQLite database",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import JSON, CSV or XML exports, one file after another.
    Import(ImportArgs),
}

#[cfg(test)]
mod tests;
