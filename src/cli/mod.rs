//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ColumnsCommand, CompileCommand, ValidateCommand};
use std::ffi::OsString;

/// Concourse pipeline compiler
#[derive(Debug, Parser, Clone)]
#[command(name = "concourse-builder")]
#[command(version = "0.1.0")]
#[command(about = "Compile declared CI jobs into a Concourse pipeline", long_about = None)]
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
    /// Compile a pipeline definition into Concourse YAML
    Compile(CompileCommand),

    /// Validate a pipeline definition
    Validate(ValidateCommand),

    /// Show how jobs are layered into columns
    Columns(ColumnsCommand),
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
