//! Resource deployment - namespace plus ordered manifest application

use crate::core::config::PipelineConfig;
use crate::core::error::PipelineError;
use crate::execution::command::{CommandExecutor, CommandSpec};
use tracing::info;

/// Applies the configured manifests into the target namespace. Relies on
/// the apply semantics of the underlying tool for idempotency: an
/// unchanged manifest is a no-op, a changed one updates the resource.
pub struct ResourceDeployer<'a, E> {
    executor: &'a E,
    config: &'a PipelineConfig,
}

impl<'a, E: CommandExecutor> ResourceDeployer<'a, E> {
    pub fn new(executor: &'a E, config: &'a PipelineConfig) -> Self {
        Self { executor, config }
    }

    /// Ensure the namespace, then apply every manifest in configured
    /// order. The first manifest failure aborts the rest.
    pub async fn deploy(&self) -> Result<(), PipelineError> {
        self.ensure_namespace().await?;

        for manifest in &self.config.manifests {
            let path = manifest.display().to_string();
            let result = self
                .executor
                .execute(
                    &CommandSpec::new(
                        "kubectl",
                        ["apply", "-n", self.config.namespace.as_str(), "-f", path.as_str()],
                    ),
                    self.config.command_timeout(),
                )
                .await;
            if !result.success() {
                return Err(PipelineError::Tooling {
                    stage: "manifest-apply",
                    command: result.command.clone(),
                    detail: result.failure_detail(),
                });
            }
            info!("applied {}", path);
        }

        Ok(())
    }

    /// Submit the namespace declaratively through stdin. Re-applying an
    /// existing namespace is a no-op, so "already exists" never surfaces
    /// as an error and no error text needs inspecting.
    async fn ensure_namespace(&self) -> Result<(), PipelineError> {
        let result = self
            .executor
            .execute(
                &CommandSpec::new("kubectl", ["apply", "-f", "-"])
                    .with_stdin(namespace_manifest(&self.config.namespace)),
                self.config.command_timeout(),
            )
            .await;
        if !result.success() {
            return Err(PipelineError::Tooling {
                stage: "namespace-apply",
                command: result.command.clone(),
                detail: result.failure_detail(),
            });
        }

        if result.stdout.contains("unchanged") {
            info!(
                "namespace {} already exists, continuing",
                self.config.namespace
            );
        } else {
            info!("namespace {} ensured", self.config.namespace);
        }
        Ok(())
    }
}

/// Minimal namespace definition for declarative apply.
fn namespace_manifest(name: &str) -> String {
    format!(
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: {}\n",
        name
    )
}
