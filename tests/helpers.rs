//! Test utilities: scripted fakes and run-report assertions

use async_trait::async_trait;
use atlas_pipeline::cluster::HealthProbe;
use atlas_pipeline::core::config::PipelineConfig;
use atlas_pipeline::core::report::{RunReport, StepStatus};
use atlas_pipeline::core::step::PipelineStep;
use atlas_pipeline::execution::command::{
    CommandExecutor, CommandResult, CommandSpec, CommandStatus,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Command executor that replays scripted results in order and records
/// every call.
///
/// This is useful for:
/// - Fast, deterministic tests without real minikube/kubectl
/// - Asserting exact command sequences (conditional start, apply order)
/// - Forcing failures at a chosen call (stop-at-first-failure checks)
#[derive(Clone)]
pub struct FakeExecutor {
    responses: Arc<Mutex<VecDeque<CommandResult>>>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl FakeExecutor {
    pub fn new(responses: Vec<CommandResult>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every command spec observed so far, in call order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Observed command lines, in call order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|spec| spec.display_line())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(&self, spec: &CommandSpec, _limit: Duration) -> CommandResult {
        self.calls.lock().unwrap().push(spec.clone());
        let mut result = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                panic!(
                    "FakeExecutor: no scripted result for `{}`",
                    spec.display_line()
                )
            });
        result.command = spec.display_line();
        result
    }
}

/// Scripted health probe that counts attempts and records probed URLs.
#[derive(Clone)]
pub struct FakeProbe {
    outcomes: Arc<Mutex<VecDeque<bool>>>,
    exhausted_default: Option<bool>,
    calls: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl FakeProbe {
    /// Probe with an exact outcome script; panics if probed more often.
    pub fn new(outcomes: Vec<bool>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            exhausted_default: None,
            calls: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Probe that always reports healthy.
    pub fn healthy() -> Self {
        let mut probe = Self::new(vec![]);
        probe.exhausted_default = Some(true);
        probe
    }

    /// Probe that never reports healthy.
    pub fn unhealthy() -> Self {
        let mut probe = Self::new(vec![]);
        probe.exhausted_default = Some(false);
        probe
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HealthProbe for FakeProbe {
    async fn check(&self, url: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => self
                .exhausted_default
                .unwrap_or_else(|| panic!("FakeProbe: no scripted outcome for GET {}", url)),
        }
    }
}

/// Successful command result with the given stdout.
pub fn ok(stdout: &str) -> CommandResult {
    CommandResult {
        command: String::new(),
        status: CommandStatus::Success,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Non-zero exit with the given code and stderr.
pub fn failed(code: i32, stderr: &str) -> CommandResult {
    CommandResult {
        command: String::new(),
        status: CommandStatus::Failed { code: Some(code) },
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Command abandoned at its timeout.
pub fn timed_out(secs: u64) -> CommandResult {
    CommandResult {
        command: String::new(),
        status: CommandStatus::TimedOut {
            limit: Duration::from_secs(secs),
        },
        stdout: String::new(),
        stderr: String::new(),
    }
}

/// Responses for a cluster that is already up: status, context switch,
/// node listing.
pub fn cluster_running() -> Vec<CommandResult> {
    vec![
        ok("Running"),
        ok(""),
        ok("minikube   Ready   control-plane   5m   v1.30.0"),
    ]
}

/// Responses for a cold cluster that starts cleanly.
pub fn cluster_cold() -> Vec<CommandResult> {
    vec![
        ok("Stopped"),
        ok("Done! kubectl is now configured"),
        ok(""),
        ok("minikube   Ready   control-plane   1m   v1.30.0"),
    ]
}

/// Responses for a clean deploy: namespace apply plus one success per
/// manifest.
pub fn deploy_clean(manifest_count: usize) -> Vec<CommandResult> {
    let mut responses = vec![ok("namespace/atlas created")];
    for _ in 0..manifest_count {
        responses.push(ok("configured"));
    }
    responses
}

/// Default test configuration with the workflow routed into a temp path.
pub fn test_config(workflow_path: std::path::PathBuf) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.workflow_path = workflow_path;
    config
}

/// Assert the run completed with every step successful.
pub fn assert_run_completed(report: &RunReport) {
    assert!(
        report.is_success(),
        "run should have completed, but failed at {:?}",
        report.failed_step().map(|s| s.step)
    );
    assert!(
        report
            .steps
            .iter()
            .all(|s| s.status == StepStatus::Completed),
        "all steps should be completed: {:?}",
        report.steps
    );
}

/// Assert the run failed at the given step and skipped everything after.
pub fn assert_run_failed_at(report: &RunReport, step: PipelineStep) {
    assert!(!report.is_success(), "run should have failed");
    let failed = report
        .failed_step()
        .unwrap_or_else(|| panic!("no failed step recorded in {:?}", report.steps));
    assert_eq!(failed.step, step, "run failed at the wrong step");

    let failed_index = PipelineStep::SEQUENCE
        .iter()
        .position(|s| *s == step)
        .unwrap();
    for later in &PipelineStep::SEQUENCE[failed_index + 1..] {
        assert_eq!(
            report.step(*later).map(|s| s.status),
            Some(StepStatus::Skipped),
            "step {} should have been skipped",
            later
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_executor_replays_in_order() {
        let executor = FakeExecutor::new(vec![ok("first"), failed(1, "second")]);

        let spec = CommandSpec::new("kubectl", ["get", "nodes"]);
        let r1 = executor.execute(&spec, Duration::from_secs(1)).await;
        assert!(r1.success());
        assert_eq!(r1.stdout, "first");
        assert_eq!(r1.command, "kubectl get nodes");

        let r2 = executor.execute(&spec, Duration::from_secs(1)).await;
        assert!(!r2.success());
        assert_eq!(executor.call_count(), 2);
        assert_eq!(executor.remaining(), 0);
    }

    #[tokio::test]
    async fn test_fake_probe_scripted_outcomes() {
        let probe = FakeProbe::new(vec![false, true]);
        assert!(!probe.check("http://10.0.0.1:30080/health").await);
        assert!(probe.check("http://10.0.0.1:30080/health").await);
        assert_eq!(probe.calls(), 2);
        assert_eq!(probe.urls().len(), 2);
    }
}
