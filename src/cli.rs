//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Feature Model - Assemble OSGi features and derive API region data
#[derive(Parser, Debug)]
#[command(name = "feature-model")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble a feature by resolving its includes
    Assemble(commands::assemble::AssembleArgs),

    /// Aggregate features into an application
    Aggregate(commands::aggregate::AggregateArgs),

    /// Derive API region property files from features
    Regions(commands::regions::RegionsArgs),

    /// Resolve artifacts into the local cache
    Fetch(commands::fetch::FetchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .format_timestamp(None)
            .init();

        match self.command {
            Commands::Assemble(args) => commands::assemble::execute(args),
            Commands::Aggregate(args) => commands::aggregate::execute(args),
            Commands::Regions(args) => commands::regions::execute(args),
            Commands::Fetch(args) => commands::fetch::execute(args),
        }
    }
}
