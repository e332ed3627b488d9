//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ResolveCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Resolve and run containerized neuroimaging pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "neuropipe")]
#[command(version)]
#[command(about = "Resolve and run containerized neuroimaging pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the resolved container invocation of a pipeline step
    Resolve(ResolveCommand),

    /// Validate a global configuration file
    Validate(ValidateCommand),

    /// Resolve a pipeline step and run it
    Run(RunCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
