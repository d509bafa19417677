//! Pipeline configuration from YAML, flags, or environment

use crate::core::retry::RetryPolicy;
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Immutable pipeline configuration, constructed once at startup and
/// passed by reference into each component. Every field has a default
/// matching the stock atlas-app deployment, so a YAML file only needs to
/// name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target namespace for all deployed resources.
    pub namespace: String,

    /// NodePort the service is exposed on.
    pub node_port: u16,

    /// Image reference built into the CI workflow.
    pub image: String,

    /// Where the generated workflow is written.
    pub workflow_path: PathBuf,

    /// Manifest paths, applied strictly in this order.
    pub manifests: Vec<PathBuf>,

    /// Readiness endpoint path on the deployed service.
    pub health_path: String,

    /// Health check attempts, including the first.
    pub health_attempts: usize,

    /// Seconds between health check attempts.
    pub health_delay_secs: u64,

    /// Per-probe HTTP timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Wall-clock bound on each external command.
    pub command_timeout_secs: u64,

    /// kubectl context of the managed cluster.
    pub context: String,

    /// Minikube VM driver used when the cluster must be started.
    pub driver: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            namespace: "atlas".to_string(),
            node_port: 30080,
            image: "atlas-app:latest".to_string(),
            workflow_path: PathBuf::from(".github/workflows/ci-atlas.yaml"),
            manifests: vec![
                PathBuf::from("k8s/atlas-deployment.yaml"),
                PathBuf::from("k8s/atlas-service-nodeport.yaml"),
            ],
            health_path: "/health".to_string(),
            health_attempts: 5,
            health_delay_secs: 2,
            probe_timeout_secs: 5,
            command_timeout_secs: 300,
            context: "minikube".to_string(),
            driver: "docker".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        // Namespaces are RFC 1123 labels.
        let label = Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$")?;
        if self.namespace.len() > 63 || !label.is_match(&self.namespace) {
            anyhow::bail!(
                "namespace {:?} is not a valid RFC 1123 label",
                self.namespace
            );
        }

        if !(30000..=32767).contains(&self.node_port) {
            anyhow::bail!(
                "node port {} is outside the NodePort range 30000-32767",
                self.node_port
            );
        }

        if self.image.trim().is_empty() {
            anyhow::bail!("image reference must not be empty");
        }

        if self.manifests.is_empty() {
            anyhow::bail!("at least one manifest path is required");
        }

        if self.health_attempts == 0 {
            anyhow::bail!("health attempts must be at least 1");
        }

        if !self.health_path.starts_with('/') {
            anyhow::bail!("health path {:?} must start with '/'", self.health_path);
        }

        Ok(())
    }

    /// Retry policy for the health verifier.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.health_attempts,
            Duration::from_secs(self.health_delay_secs),
        )
    }

    /// Wall-clock bound applied to each external command.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Per-attempt bound on a single health probe.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Readiness URL for the given cluster address.
    pub fn health_url(&self, address: &str) -> String {
        format!("http://{}:{}{}", address, self.node_port, self.health_path)
    }
}
