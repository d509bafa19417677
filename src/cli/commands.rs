//! CLI command definitions

use crate::core::config::PipelineConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Configuration inputs shared by the pipeline commands. Every value can
/// come from a YAML file, a flag, or an environment variable; flags and
/// environment override the file, which overrides the defaults.
#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Path to a pipeline YAML configuration file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Target namespace
    #[arg(long, env = "ATLAS_NAMESPACE")]
    pub namespace: Option<String>,

    /// NodePort the service is exposed on
    #[arg(long, env = "ATLAS_NODE_PORT")]
    pub port: Option<u16>,

    /// Image reference to build and load in CI
    #[arg(long, env = "ATLAS_IMAGE")]
    pub image: Option<String>,

    /// Manifest path, applied in order (repeatable)
    #[arg(long = "manifest")]
    pub manifests: Vec<PathBuf>,

    /// Output path for the generated CI workflow
    #[arg(long, env = "ATLAS_WORKFLOW_PATH")]
    pub workflow: Option<PathBuf>,

    /// Health check attempts
    #[arg(long, env = "ATLAS_HEALTH_ATTEMPTS")]
    pub health_attempts: Option<usize>,

    /// Seconds between health check attempts
    #[arg(long, env = "ATLAS_HEALTH_DELAY")]
    pub health_delay: Option<u64>,
}

impl ConfigArgs {
    /// Resolve the effective pipeline configuration.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.file {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(port) = self.port {
            config.node_port = port;
        }
        if let Some(image) = &self.image {
            config.image = image.clone();
        }
        if !self.manifests.is_empty() {
            config.manifests = self.manifests.clone();
        }
        if let Some(workflow) = &self.workflow {
            config.workflow_path = workflow.clone();
        }
        if let Some(attempts) = self.health_attempts {
            config.health_attempts = attempts;
        }
        if let Some(delay) = self.health_delay {
            config.health_delay_secs = delay;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run the full deployment pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Generate the CI workflow file only
#[derive(Debug, Args, Clone)]
pub struct EmitCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Validate a pipeline configuration file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to a pipeline YAML configuration file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Delete the local cluster
#[derive(Debug, Args, Clone)]
pub struct TeardownCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}
