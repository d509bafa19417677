//! External command execution with timeout and outcome classification

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// One external invocation: program, arguments, and an optional stdin
/// payload for declarative apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
        }
    }

    /// Attach a payload to pipe through the child's stdin.
    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }

    /// The command line as logged and reported in diagnostics.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

/// How an invocation ended. Timeout, non-zero exit, and spawn failure
/// are distinct kinds so callers can decide tolerance per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed { code: Option<i32> },
    TimedOut { limit: Duration },
    SpawnFailed { reason: String },
}

/// Outcome of one external invocation. Failures are data, never panics
/// or errors; the calling step decides what is tolerable.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The command line that was run, for diagnostics.
    pub command: String,
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == CommandStatus::Success
    }

    /// Human-readable failure description for error reporting.
    pub fn failure_detail(&self) -> String {
        match &self.status {
            CommandStatus::Success => "succeeded".to_string(),
            CommandStatus::Failed { code } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let stderr = self.stderr.trim();
                if stderr.is_empty() {
                    format!("exited with code {}", code)
                } else {
                    format!("exited with code {}: {}", code, stderr)
                }
            }
            CommandStatus::TimedOut { limit } => {
                format!("timed out after {}s", limit.as_secs())
            }
            CommandStatus::SpawnFailed { reason } => {
                format!("could not spawn: {}", reason)
            }
        }
    }
}

/// Seam for command execution, so every component can be driven by a
/// scripted fake in tests.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command to completion within `limit`. All failures come
    /// back as data in the result, never as an error.
    async fn execute(&self, spec: &CommandSpec, limit: Duration) -> CommandResult;
}

/// Production executor backed by tokio subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(&self, spec: &CommandSpec, limit: Duration) -> CommandResult {
        let command = spec.display_line();
        info!("$ {}", command);

        let outcome = timeout(limit, run_child(spec)).await;

        let result = match outcome {
            Err(_) => CommandResult {
                command,
                status: CommandStatus::TimedOut { limit },
                stdout: String::new(),
                stderr: String::new(),
            },
            Ok(Err(err)) => CommandResult {
                command,
                status: CommandStatus::SpawnFailed {
                    reason: err.to_string(),
                },
                stdout: String::new(),
                stderr: String::new(),
            },
            Ok(Ok(output)) => {
                let status = if output.status.success() {
                    CommandStatus::Success
                } else {
                    CommandStatus::Failed {
                        code: output.status.code(),
                    }
                };
                CommandResult {
                    command,
                    status,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
        };

        if result.success() {
            debug!(
                "`{}` produced {} bytes of output",
                result.command,
                result.stdout.len()
            );
        } else {
            warn!("`{}` {}", result.command, result.failure_detail());
        }

        result
    }
}

async fn run_child(spec: &CommandSpec) -> std::io::Result<std::process::Output> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn()?;

    if let Some(payload) = &spec.stdin {
        if let Some(mut handle) = child.stdin.take() {
            handle.write_all(payload.as_bytes()).await?;
            // Dropping the handle closes the pipe.
        }
    }

    child.wait_with_output().await
}
