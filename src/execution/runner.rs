//! Container runner - hands a resolved invocation to the container engine

use crate::execution::resolver::ResolvedInvocation;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Error types for runner operations
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to spawn {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How the external process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Process exit code; `None` when killed by a signal, `Some(0)` for a dry run
    pub exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for running invocations - allows for different implementations
#[async_trait]
pub trait ContainerRunner: Send + Sync {
    async fn run(&self, invocation: &ResolvedInvocation) -> Result<RunOutcome, RunnerError>;
}

/// Runs invocations as a child process of the container engine
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    /// Engine subcommand placed after the executable (e.g. "run", "exec")
    subcommand: String,

    /// Optional limit on process runtime in seconds
    timeout_secs: Option<u64>,

    /// Log the command line instead of spawning it
    dry_run: bool,
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self {
            subcommand: "run".to_string(),
            timeout_secs: None,
            dry_run: false,
        }
    }
}

impl SubprocessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.subcommand = subcommand.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn subcommand(&self) -> &str {
        &self.subcommand
    }
}

#[async_trait]
impl ContainerRunner for SubprocessRunner {
    async fn run(&self, invocation: &ResolvedInvocation) -> Result<RunOutcome, RunnerError> {
        let line = invocation.command_line(&self.subcommand);
        let Some((executable, args)) = line.split_first() else {
            return Err(RunnerError::Internal("Empty command line".to_string()));
        };

        if self.dry_run {
            info!("[dry run] {}", render_command_line(&line));
            return Ok(RunOutcome { exit_code: Some(0) });
        }

        info!("Running {}: {}", invocation.id(), render_command_line(&line));
        debug!("Environment: {:?}", invocation.env_vars);

        let mut command = Command::new(executable);
        command
            .args(args)
            .envs(&invocation.env_vars)
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            executable: executable.clone(),
            source,
        })?;

        let status = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), child.wait())
                .await
                .map_err(|_| RunnerError::Timeout(secs))?,
            None => child.wait().await,
        }
        .map_err(|e| RunnerError::Internal(format!("Failed to wait for {}: {}", executable, e)))?;

        let outcome = RunOutcome {
            exit_code: status.code(),
        };
        if outcome.success() {
            info!("{} exited successfully", invocation.id());
        } else {
            warn!("{} exited with code {:?}", invocation.id(), outcome.exit_code);
        }

        Ok(outcome)
    }
}

/// Shell-style rendering for logs and dry runs
pub fn render_command_line(line: &[String]) -> String {
    line.iter()
        .map(|arg| {
            let plain = !arg.is_empty()
                && arg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@+%".contains(c));
            if plain {
                arg.clone()
            } else {
                format!("'{}'", arg.replace('\'', r"'\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
