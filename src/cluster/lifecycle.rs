//! Cluster lifecycle - idempotently ensure the local cluster is up

use crate::core::config::PipelineConfig;
use crate::core::error::PipelineError;
use crate::execution::command::{CommandExecutor, CommandSpec};
use tracing::info;

/// Manages the local Minikube cluster. State is never cached: every
/// decision re-queries the control plane, since other actors may be
/// mutating the same cluster.
pub struct ClusterManager<'a, E> {
    executor: &'a E,
    config: &'a PipelineConfig,
}

impl<'a, E: CommandExecutor> ClusterManager<'a, E> {
    pub fn new(executor: &'a E, config: &'a PipelineConfig) -> Self {
        Self { executor, config }
    }

    /// Ensure the cluster is running, the kubectl context points at it,
    /// and at least one node is reporting.
    ///
    /// Starting is conditional: a cluster that is already running is
    /// left untouched, whatever started it. Context-switch and node-list
    /// failures are fatal with no retry - they mean the tooling is
    /// broken, not that the cluster is still warming up.
    pub async fn ensure_running(&self) -> Result<(), PipelineError> {
        let limit = self.config.command_timeout();

        let status = self
            .executor
            .execute(
                &CommandSpec::new("minikube", ["status", "--format", "{{.Host}}"]),
                limit,
            )
            .await;
        let running = status.success() && status.stdout.trim() == "Running";

        if running {
            info!("cluster already running, leaving it as-is");
        } else {
            info!(
                "cluster not running, starting with the {} driver",
                self.config.driver
            );
            let start = self
                .executor
                .execute(
                    &CommandSpec::new(
                        "minikube",
                        ["start".to_string(), format!("--driver={}", self.config.driver)],
                    ),
                    limit,
                )
                .await;
            if !start.success() {
                return Err(PipelineError::ClusterStart {
                    command: start.command.clone(),
                    detail: start.failure_detail(),
                });
            }
        }

        let context = self
            .executor
            .execute(
                &CommandSpec::new(
                    "kubectl",
                    ["config", "use-context", self.config.context.as_str()],
                ),
                limit,
            )
            .await;
        if !context.success() {
            return Err(PipelineError::Tooling {
                stage: "context-switch",
                command: context.command.clone(),
                detail: context.failure_detail(),
            });
        }

        let nodes = self
            .executor
            .execute(&CommandSpec::new("kubectl", ["get", "nodes", "--no-headers"]), limit)
            .await;
        if !nodes.success() {
            return Err(PipelineError::Tooling {
                stage: "node-list",
                command: nodes.command.clone(),
                detail: nodes.failure_detail(),
            });
        }
        if nodes.stdout.trim().is_empty() {
            return Err(PipelineError::Tooling {
                stage: "node-list",
                command: nodes.command.clone(),
                detail: "cluster reports no nodes".to_string(),
            });
        }

        info!("cluster ready: {} node(s)", nodes.stdout.trim().lines().count());
        Ok(())
    }

    /// Delete the managed cluster to free local resources.
    pub async fn delete(&self) -> Result<(), PipelineError> {
        let result = self
            .executor
            .execute(
                &CommandSpec::new("minikube", ["delete"]),
                self.config.command_timeout(),
            )
            .await;
        if !result.success() {
            return Err(PipelineError::Tooling {
                stage: "cluster-delete",
                command: result.command.clone(),
                detail: result.failure_detail(),
            });
        }
        info!("cluster deleted");
        Ok(())
    }
}
