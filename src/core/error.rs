//! Pipeline error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures. Every variant aborts the run with a non-zero
/// exit; there is no partial-success continuation mode.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The cluster start command itself failed.
    #[error("cluster start failed: `{command}`: {detail}")]
    ClusterStart { command: String, detail: String },

    /// Broken tooling: context switch, node listing, namespace or
    /// manifest apply. Indicates a broken environment rather than a
    /// timing condition, so it is never retried.
    #[error("{stage} failed: `{command}`: {detail}")]
    Tooling {
        stage: &'static str,
        command: String,
        detail: String,
    },

    /// The cluster exposed no reachable address. Raised before the first
    /// probe; consumes none of the retry budget.
    #[error("address resolution failed: `{command}`: {detail}")]
    AddressUnresolved { command: String, detail: String },

    /// The deployment applied cleanly but the service never answered.
    #[error("health check exhausted after {attempts} attempts: GET {url}")]
    HealthCheckExhausted { attempts: usize, url: String },

    /// The workflow file could not be written.
    #[error("failed to write workflow to {}: {source}", path.display())]
    WorkflowWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
