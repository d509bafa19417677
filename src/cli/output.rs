//! CLI output formatting

use crate::core::report::{RunReport, StepStatus};
use crate::execution::engine::PipelineEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Progress bar over the pipeline steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress.set_style(bar_style.progress_chars("#>-"));
    }
    progress
}

/// Format a pipeline event for display
pub fn format_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::PipelineStarted { run_id } => format!(
            "{} Starting deployment pipeline ({})",
            ROCKET,
            style(&run_id.to_string()[..8]).dim()
        ),
        PipelineEvent::StepStarted { step } => {
            format!("{} {}", SPINNER, style(step).cyan())
        }
        PipelineEvent::StepCompleted { step } => {
            format!("{} {}", CHECK, style(step).green())
        }
        PipelineEvent::StepFailed { step, error } => {
            format!("{} {}: {}", CROSS, style(step).red(), error)
        }
        PipelineEvent::PipelineCompleted { success, .. } => {
            if *success {
                format!("{} pipeline {}", CHECK, style("completed").green())
            } else {
                format!("{} pipeline {}", CROSS, style("failed").red())
            }
        }
    }
}

/// Format the final run summary
pub fn format_report(report: &RunReport) -> String {
    let mut lines = Vec::new();
    for step in &report.steps {
        let line = match step.status {
            StepStatus::Completed => format!("  {} {}", CHECK, style(step.step).green()),
            StepStatus::Failed => format!(
                "  {} {} - {}",
                CROSS,
                style(step.step).red(),
                step.detail.as_deref().unwrap_or("unknown failure")
            ),
            StepStatus::Skipped => format!("  {} {}", INFO, style(step.step).dim()),
        };
        lines.push(line);
    }
    lines.join("\n")
}
