//! Pipeline engine - drives the four deployment steps in order

use crate::cluster::{ClusterManager, HealthProbe, HealthVerifier, ResourceDeployer};
use crate::core::config::PipelineConfig;
use crate::core::error::PipelineError;
use crate::core::report::{RunReport, StepReport};
use crate::core::step::PipelineStep;
use crate::execution::command::CommandExecutor;
use crate::workflow;
use chrono::Utc;
use std::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Events that occur during a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PipelineStarted {
        run_id: Uuid,
    },
    StepStarted {
        step: PipelineStep,
    },
    StepCompleted {
        step: PipelineStep,
    },
    StepFailed {
        step: PipelineStep,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        success: bool,
    },
}

/// Type for event handlers
pub type EventHandler = Box<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Runs the pipeline steps strictly in order, each step gating the
/// next. The engine owns the executor and probe; components borrow them
/// per step, so a scripted executor drives the whole pipeline in tests.
pub struct PipelineEngine<E, P> {
    executor: E,
    probe: P,
    config: PipelineConfig,
    event_handlers: Mutex<Vec<EventHandler>>,
}

impl<E: CommandExecutor, P: HealthProbe> PipelineEngine<E, P> {
    pub fn new(executor: E, probe: P, config: PipelineConfig) -> Self {
        Self {
            executor,
            probe,
            config,
            event_handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.event_handlers.lock() {
            handlers.push(Box::new(handler));
        }
    }

    fn emit_event(&self, event: PipelineEvent) {
        if let Ok(handlers) = self.event_handlers.lock() {
            for handler in handlers.iter() {
                handler(&event);
            }
        }
    }

    /// Execute the full pipeline and return the run report. A step
    /// failure aborts the run; remaining steps are recorded as skipped.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new();
        info!("starting pipeline run {}", report.run_id);
        self.emit_event(PipelineEvent::PipelineStarted {
            run_id: report.run_id,
        });

        let mut failed = false;
        for step in PipelineStep::SEQUENCE {
            if failed {
                report.record(StepReport::skipped(step));
                continue;
            }

            self.emit_event(PipelineEvent::StepStarted { step });
            let started_at = Utc::now();

            match self.run_step(step).await {
                Ok(()) => {
                    info!("{} completed", step);
                    report.record(StepReport::completed(step, started_at));
                    self.emit_event(PipelineEvent::StepCompleted { step });
                }
                Err(err) => {
                    error!("{} failed: {}", step, err);
                    report.record(StepReport::failed(step, started_at, err.to_string()));
                    self.emit_event(PipelineEvent::StepFailed {
                        step,
                        error: err.to_string(),
                    });
                    failed = true;
                }
            }
        }

        if failed {
            report.fail();
        } else {
            report.complete();
        }
        self.emit_event(PipelineEvent::PipelineCompleted {
            run_id: report.run_id,
            success: report.is_success(),
        });

        report
    }

    async fn run_step(&self, step: PipelineStep) -> Result<(), PipelineError> {
        match step {
            PipelineStep::ClusterSetup => {
                ClusterManager::new(&self.executor, &self.config)
                    .ensure_running()
                    .await
            }
            PipelineStep::Deploy => {
                ResourceDeployer::new(&self.executor, &self.config)
                    .deploy()
                    .await
            }
            PipelineStep::HealthCheck => {
                HealthVerifier::new(&self.executor, &self.probe, &self.config)
                    .verify()
                    .await
            }
            PipelineStep::EmitWorkflow => workflow::emit(&self.config).map(|_| ()),
        }
    }
}
