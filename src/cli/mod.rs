//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{EmitCommand, RunCommand, TeardownCommand, ValidateCommand};

/// Minikube deployment pipeline for atlas-app
#[derive(Debug, Parser, Clone)]
#[command(name = "atlas-pipeline")]
#[command(version = "0.1.0")]
#[command(
    about = "Deploy atlas-app to a local Minikube cluster and emit the matching CI workflow",
    long_about = None
)]
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
    /// Run the full pipeline: cluster, deploy, health check, workflow
    Run(RunCommand),

    /// Generate the CI workflow file without touching the cluster
    Emit(EmitCommand),

    /// Validate a pipeline configuration file
    Validate(ValidateCommand),

    /// Delete the local cluster to free resources
    Teardown(TeardownCommand),
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

use std::ffi::OsString;
