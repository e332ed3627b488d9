//! CLI command definitions

use crate::core::{context::Subject, layout::DatasetLayout, step::StepSelector};
use clap::Args;
use std::path::PathBuf;

/// Which dataset and config file to work on
#[derive(Debug, Args, Clone)]
pub struct DatasetArgs {
    /// Dataset root directory
    #[arg(short, long)]
    pub root: PathBuf,

    /// Global config file (defaults to <root>/proc/global_config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl DatasetArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| DatasetLayout::new(&self.root).global_config_file())
    }
}

/// Pipeline/step selection shared by `resolve` and `run`
#[derive(Debug, Args, Clone)]
pub struct TargetArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Pipeline name
    #[arg(short, long)]
    pub pipeline: String,

    /// Pipeline version (defaults to the first listed version)
    #[arg(long)]
    pub pipeline_version: Option<String>,

    /// Step name; may be omitted for single-step pipelines
    #[arg(short, long)]
    pub step: Option<String>,

    /// Participant ID, with or without the "sub-" prefix
    #[arg(long)]
    pub participant: Option<String>,

    /// Session ID, with or without the "ses-" prefix
    #[arg(long, requires = "participant")]
    pub session: Option<String>,
}

impl TargetArgs {
    pub fn step_selector(&self) -> StepSelector<'_> {
        StepSelector::from(self.step.as_deref())
    }

    pub fn subject(&self) -> Option<Subject> {
        self.participant.as_ref().map(|participant| {
            let subject = Subject::new(participant.clone());
            match &self.session {
                Some(session) => subject.with_session(session.clone()),
                None => subject,
            }
        })
    }
}

/// Print the resolved invocation of a pipeline step
#[derive(Debug, Args, Clone)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resolve every step of the pipeline
    #[arg(long, conflicts_with = "step")]
    pub all_steps: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate a global configuration file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to the global config file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Resolve a pipeline step and run it in its container
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Container engine subcommand
    #[arg(long, default_value = "run")]
    pub subcommand: String,

    /// Kill the container after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the command line without running it
    #[arg(long)]
    pub dry_run: bool,
}
