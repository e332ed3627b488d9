//! Resolution orchestrator - turns a (pipeline, version, step) request into a
//! ready-to-run container invocation

use crate::core::{
    config::GlobalConfig,
    container::{bind_paths, ContainerConfig},
    context::{ResolutionContext, Subject},
    error::{ConfigError, Result},
    layout::DatasetLayout,
    pipeline::{PipelineConfig, PipelineKind},
    placeholder::find_tokens,
    step::{StepConfig, StepSelector},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fully substituted invocation of one pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInvocation {
    pub pipeline_name: String,
    pub pipeline_version: String,
    pub step_name: Option<String>,
    pub pipeline_kind: PipelineKind,

    /// Container engine executable
    pub executable: String,

    /// Engine arguments, global first then pipeline then step
    pub args: Vec<String>,

    pub env_vars: BTreeMap<String, String>,

    /// Local container image
    pub image_path: Option<PathBuf>,

    /// Where the image can be pulled from
    pub image_uri: Option<String>,

    pub invocation_file_path: PathBuf,
    pub descriptor_file_path: PathBuf,
    pub tracker_config_path: Option<PathBuf>,

    /// Bind specifications found in `args`
    pub bind_paths: Vec<String>,
}

impl ResolvedInvocation {
    pub fn id(&self) -> String {
        match &self.step_name {
            Some(step) => format!("{} {} [{}]", self.pipeline_name, self.pipeline_version, step),
            None => format!("{} {}", self.pipeline_name, self.pipeline_version),
        }
    }

    /// Local image file if configured, otherwise the source URI
    pub fn image(&self) -> Option<String> {
        self.image_path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .or_else(|| self.image_uri.clone())
    }

    /// `[executable, subcommand, args.., image]`
    pub fn command_line(&self, subcommand: &str) -> Vec<String> {
        let mut line = Vec::with_capacity(self.args.len() + 3);
        line.push(self.executable.clone());
        line.push(subcommand.to_string());
        line.extend(self.args.iter().cloned());
        match self.image() {
            Some(image) => line.push(image),
            None => warn!("No container image configured for {}", self.id()),
        }
        line
    }

    /// Bracket tokens still present anywhere in the invocation
    pub fn unresolved_tokens(&self) -> Vec<String> {
        let paths = [
            Some(&self.invocation_file_path),
            Some(&self.descriptor_file_path),
            self.image_path.as_ref(),
            self.tracker_config_path.as_ref(),
        ];

        let mut tokens: Vec<String> = std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .chain(self.env_vars.values().map(String::as_str))
            .chain(self.image_uri.as_deref())
            .flat_map(find_tokens)
            .chain(
                paths
                    .into_iter()
                    .flatten()
                    .flat_map(|p| find_tokens(&p.to_string_lossy())),
            )
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens
    }

    /// Reject invocations that still carry placeholder syntax
    pub fn check_resolved(&self) -> Result<()> {
        let tokens = self.unresolved_tokens();
        if tokens.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::UnresolvedPlaceholders {
                context: self.id(),
                tokens,
            })
        }
    }
}

/// Resolves invocations against one loaded global config and dataset root
#[derive(Debug, Clone)]
pub struct InvocationResolver<'a> {
    config: &'a GlobalConfig,
    layout: DatasetLayout,
    subject: Option<Subject>,
}

impl<'a> InvocationResolver<'a> {
    pub fn new(config: &'a GlobalConfig, dataset_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            layout: DatasetLayout::new(dataset_root),
            subject: None,
        }
    }

    /// Also expand participant/session tokens
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    pub fn resolve(
        &self,
        pipeline_name: &str,
        pipeline_version: &str,
        step: StepSelector<'_>,
    ) -> Result<ResolvedInvocation> {
        info!(
            "Resolving pipeline {} {} step {}",
            pipeline_name, pipeline_version, step
        );

        let (kind, pipeline) = self
            .config
            .find_pipeline_with_kind(pipeline_name, pipeline_version)?;
        let step = pipeline.find_step(step)?;
        self.check_session()?;

        self.resolve_step(kind, pipeline, step)
    }

    /// One invocation per step, in step order
    pub fn resolve_all_steps(
        &self,
        pipeline_name: &str,
        pipeline_version: &str,
    ) -> Result<Vec<ResolvedInvocation>> {
        let (kind, pipeline) = self
            .config
            .find_pipeline_with_kind(pipeline_name, pipeline_version)?;
        self.check_session()?;

        pipeline
            .steps
            .iter()
            .map(|step| self.resolve_step(kind, pipeline, step))
            .collect()
    }

    fn check_session(&self) -> Result<()> {
        let Some(session) = self.subject.as_ref().and_then(|s| s.session_id.as_ref()) else {
            return Ok(());
        };
        let known = self.config.sessions();
        let bids_session = format!("ses-{}", session);
        if known.iter().any(|s| s == session || *s == bids_session) {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "Session '{}' is not one of the configured sessions ({})",
                session,
                known.join(", ")
            )))
        }
    }

    fn resolve_step(
        &self,
        kind: PipelineKind,
        pipeline: &PipelineConfig,
        step: &StepConfig,
    ) -> Result<ResolvedInvocation> {
        let context = ResolutionContext::new(&self.layout, pipeline, step, self.subject.as_ref())
            .with_substitutions(&self.config.substitutions);

        // Paths and image references only see built-in tokens
        let path_tokens = context.path_tokens();
        let container_info = pipeline
            .container_info
            .as_ref()
            .map(|info| path_tokens.resolve(info))
            .unwrap_or_default();
        let image_path = container_info.file.map(PathBuf::from);
        let image_uri = container_info.uri;

        let invocation_file_path = match &step.invocation_file {
            Some(template) => PathBuf::from(path_tokens.resolve(template)),
            None => default_file(&self.layout.invocations(), pipeline, step)?,
        };
        let descriptor_file_path = match &step.descriptor_file {
            Some(template) => PathBuf::from(path_tokens.resolve(template)),
            None => default_file(&self.layout.descriptors(), pipeline, step)?,
        };
        let tracker_config_path = pipeline
            .tracker_config_file
            .as_ref()
            .map(|template| PathBuf::from(path_tokens.resolve(template)));

        debug!(
            "Resolved files for {}: invocation={}, descriptor={}",
            pipeline.id(),
            invocation_file_path.display(),
            descriptor_file_path.display()
        );

        let merged = ContainerConfig::merge_layers([
            Some(&self.config.container_config),
            pipeline.container_config.as_ref(),
            step.container_config.as_ref(),
        ])
        .unwrap_or_default();
        let container = context.full_tokens().resolve(&merged);

        debug!(
            "Merged container config for {}: {} args, {} env vars",
            pipeline.id(),
            container.args.len(),
            container.env_vars.len()
        );

        Ok(ResolvedInvocation {
            pipeline_name: pipeline.name.clone(),
            pipeline_version: pipeline.version.clone(),
            step_name: step.name.clone(),
            pipeline_kind: kind,
            executable: container.command_or_default().to_string(),
            bind_paths: bind_paths(&container.args),
            args: container.args,
            env_vars: container.env_vars,
            image_path,
            image_uri,
            invocation_file_path,
            descriptor_file_path,
            tracker_config_path,
        })
    }
}

fn default_file(dir: &Path, pipeline: &PipelineConfig, step: &StepConfig) -> Result<PathBuf> {
    Ok(dir.join(format!("{}.json", pipeline.file_stem(step)?)))
}

/// Resolve one step of a pipeline against `dataset_root`
pub fn resolve_invocation(
    config: &GlobalConfig,
    pipeline_name: &str,
    pipeline_version: &str,
    step: StepSelector<'_>,
    dataset_root: &Path,
) -> Result<ResolvedInvocation> {
    InvocationResolver::new(config, dataset_root).resolve(pipeline_name, pipeline_version, step)
}
