//! Run report summarizing one pipeline invocation

use crate::core::step::PipelineStep;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Failed,
    /// Never started because an earlier step failed.
    Skipped,
}

/// Record of one step within a run.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: PipelineStep,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Error text for failed steps.
    pub detail: Option<String>,
}

impl StepReport {
    pub fn completed(step: PipelineStep, started_at: DateTime<Utc>) -> Self {
        Self {
            step,
            status: StepStatus::Completed,
            started_at: Some(started_at),
            completed_at: Some(Utc::now()),
            detail: None,
        }
    }

    pub fn failed(step: PipelineStep, started_at: DateTime<Utc>, detail: String) -> Self {
        Self {
            step,
            status: StepStatus::Failed,
            started_at: Some(started_at),
            completed_at: Some(Utc::now()),
            detail: Some(detail),
        }
    }

    pub fn skipped(step: PipelineStep) -> Self {
        Self {
            step,
            status: StepStatus::Skipped,
            started_at: None,
            completed_at: None,
            detail: None,
        }
    }
}

/// Full report of one pipeline invocation. Nothing here outlives the
/// process; the report exists for the terminal summary and `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: StepReport) {
        self.steps.push(step);
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self) {
        self.status = RunStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// The step that aborted the run, if any.
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn step(&self, step: PipelineStep) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
