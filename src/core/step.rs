//! Pipeline step domain model

use serde::Serialize;
use std::fmt;

/// The four pipeline steps, in execution order. Each step gates the
/// next; there is no branching and no retrying across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    ClusterSetup,
    Deploy,
    HealthCheck,
    EmitWorkflow,
}

impl PipelineStep {
    /// Execution order of a full run.
    pub const SEQUENCE: [PipelineStep; 4] = [
        PipelineStep::ClusterSetup,
        PipelineStep::Deploy,
        PipelineStep::HealthCheck,
        PipelineStep::EmitWorkflow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::ClusterSetup => "cluster-setup",
            PipelineStep::Deploy => "deploy",
            PipelineStep::HealthCheck => "health-check",
            PipelineStep::EmitWorkflow => "emit-workflow",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
