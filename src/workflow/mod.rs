//! CI workflow emission - renders the pipeline as a GitHub Actions job

use crate::core::config::PipelineConfig;
use crate::core::error::PipelineError;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Render the workflow text. Pure and deterministic: identical
/// configuration yields byte-identical output, and the emitted steps
/// mirror the local pipeline so the two cannot drift apart.
pub fn render(config: &PipelineConfig) -> String {
    let mut deploy_script = format!(
        "          kubectl create namespace {ns} --dry-run=client -o yaml | kubectl apply -f -\n",
        ns = config.namespace
    );
    for manifest in &config.manifests {
        deploy_script.push_str(&format!(
            "          kubectl apply -n {ns} -f {path}\n",
            ns = config.namespace,
            path = manifest.display()
        ));
    }

    format!(
        "\
name: CI - {ns}
on:
  push:
    branches: [ main ]

jobs:
  minikube-ci:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4

      - name: Start Minikube
        uses: medyagh/setup-minikube@latest

      - name: Build Docker image
        run: docker build -t {image} .

      - name: Load image into Minikube
        run: minikube image load {image}

      - name: Deploy to Minikube
        run: |
{deploy_script}

      - name: Smoke-test the service
        run: |
          IP=$(minikube ip)
          curl --fail --retry {attempts} --retry-delay {delay} --retry-all-errors http://$IP:{port}{health_path}
",
        ns = config.namespace,
        image = config.image,
        deploy_script = deploy_script.trim_end_matches('\n'),
        attempts = config.health_attempts,
        delay = config.health_delay_secs,
        port = config.node_port,
        health_path = config.health_path,
    )
}

/// Persist the rendered workflow to the configured path, creating
/// intermediate directories as needed. A write failure is fatal and
/// reported with the attempted path.
pub fn emit(config: &PipelineConfig) -> Result<PathBuf, PipelineError> {
    let path = config.workflow_path.clone();
    let text = render(config);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::WorkflowWrite {
            path: path.clone(),
            source,
        })?;
    }
    fs::write(&path, text).map_err(|source| PipelineError::WorkflowWrite {
        path: path.clone(),
        source,
    })?;

    info!("generated workflow: {}", path.display());
    Ok(path)
}
