//! # Feature Model CLI
//!
//! This is the binary entry point for the `feature-model` command-line tool.
//!
//! It parses the command line with `clap`, runs the selected command and
//! reports errors through `anyhow`. All feature handling lives in the
//! `feature_model` library; the binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
