use anyhow::{Context, Result};
use atlas_pipeline::cli::commands::{EmitCommand, RunCommand, TeardownCommand, ValidateCommand};
use atlas_pipeline::cli::output::{self, style, CHECK, CROSS, INFO};
use atlas_pipeline::cli::{Cli, Command};
use atlas_pipeline::cluster::{ClusterManager, HttpProbe};
use atlas_pipeline::core::config::PipelineConfig;
use atlas_pipeline::core::step::PipelineStep;
use atlas_pipeline::execution::command::SystemExecutor;
use atlas_pipeline::execution::engine::{PipelineEngine, PipelineEvent};
use atlas_pipeline::workflow;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Emit(cmd) => emit_workflow(cmd)?,
        Command::Validate(cmd) => validate_config(cmd)?,
        Command::Teardown(cmd) => teardown_cluster(cmd).await?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let config = cmd
        .config
        .resolve()
        .context("Failed to resolve pipeline configuration")?;

    println!(
        "{} Deploying {} to namespace {}",
        INFO,
        style(&config.image).bold(),
        style(&config.namespace).cyan()
    );

    let workflow_path = config.workflow_path.clone();
    let probe = HttpProbe::new(config.probe_timeout()).context("Failed to build HTTP probe")?;
    let engine = PipelineEngine::new(SystemExecutor, probe, config);

    // Console display over the engine's event stream
    let progress = output::create_progress_bar(PipelineStep::SEQUENCE.len());
    let bar = progress.clone();
    engine.add_event_handler(move |event| {
        bar.println(output::format_event(event));
        if matches!(
            event,
            PipelineEvent::StepCompleted { .. } | PipelineEvent::StepFailed { .. }
        ) {
            bar.inc(1);
        }
    });

    println!();
    let report = engine.run().await;
    progress.finish_and_clear();

    println!("{}", output::format_report(&report));

    if cmd.json {
        println!("\n{}", serde_json::to_string_pretty(&report)?);
    }

    if report.is_success() {
        println!(
            "\n{} {} {}",
            CHECK,
            style("atlas pipeline").bold(),
            style("completed successfully").green()
        );
        println!(
            "{} Commit & push {} to run the same steps in CI",
            INFO,
            style(workflow_path.display()).dim()
        );
        Ok(())
    } else {
        if let Some(failed) = report.failed_step() {
            println!(
                "\n{} {} failed at {}: {}",
                CROSS,
                style("atlas pipeline").bold(),
                style(failed.step).red(),
                failed.detail.as_deref().unwrap_or("unknown failure")
            );
            error!(
                "pipeline aborted at {}: {}",
                failed.step,
                failed.detail.as_deref().unwrap_or("unknown failure")
            );
        }
        std::process::exit(1);
    }
}

fn emit_workflow(cmd: &EmitCommand) -> Result<()> {
    let config = cmd
        .config
        .resolve()
        .context("Failed to resolve pipeline configuration")?;

    match workflow::emit(&config) {
        Ok(path) => {
            println!("{} Generated workflow: {}", CHECK, style(path.display()).bold());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", CROSS, style(&e).red());
            std::process::exit(1);
        }
    }
}

fn validate_config(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline configuration...", INFO);

    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Configuration is valid!", CHECK);
            println!("  Namespace: {}", style(&config.namespace).bold());
            println!("  Image: {}", style(&config.image).bold());
            println!("  Manifests: {}", style(config.manifests.len()).cyan());
            println!(
                "  Health checks: {} x {}s",
                style(config.health_attempts).cyan(),
                style(config.health_delay_secs).cyan()
            );

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

async fn teardown_cluster(cmd: &TeardownCommand) -> Result<()> {
    let config = cmd
        .config
        .resolve()
        .context("Failed to resolve pipeline configuration")?;

    let executor = SystemExecutor;
    match ClusterManager::new(&executor, &config).delete().await {
        Ok(()) => {
            println!("{} Cluster deleted", CHECK);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", CROSS, style(&e).red());
            std::process::exit(1);
        }
    }
}
