//! Pipeline configuration model and step lookup

use crate::core::{
    container::{ContainerConfig, ContainerInfo},
    error::{ConfigError, Result},
    step::{StepConfig, StepSelector},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Which collection of the global config a pipeline belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// BIDS conversion pipelines
    Bids,
    /// Processing pipelines
    Proc,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineKind::Bids => write!(f, "bids"),
            PipelineKind::Proc => write!(f, "proc"),
        }
    }
}

/// Configuration of one versioned pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct PipelineConfig {
    pub name: String,

    /// Free-form version string, not required to be semver
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_info: Option<ContainerInfo>,

    /// Overrides merged on top of the global container defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_config: Option<ContainerConfig>,

    /// Ordered steps; never empty once validated
    pub steps: Vec<StepConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_config_file: Option<String>,
}

impl PipelineConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            container_info: None,
            container_config: None,
            steps: vec![StepConfig::default()],
            tracker_config_file: None,
        }
    }

    /// `name version`, used in messages
    pub fn id(&self) -> String {
        format!("{} {}", self.name, self.version)
    }

    pub fn matches(&self, name: &str, version: &str) -> bool {
        self.name == name && self.version == version
    }

    /// Check step shape: at least one step, and unique names whenever
    /// there is more than one
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.version.is_empty() {
            return Err(ConfigError::Schema(format!(
                "Pipeline name and version must be non-empty (got '{}')",
                self.id()
            )));
        }

        if self.steps.is_empty() {
            return Err(ConfigError::Schema(format!(
                "Pipeline '{}' has no steps",
                self.id()
            )));
        }

        if self.steps.len() > 1 {
            let mut seen = HashSet::new();
            for (i, step) in self.steps.iter().enumerate() {
                let name = step.name().ok_or_else(|| {
                    ConfigError::Schema(format!(
                        "Pipeline '{}' has {} steps but step #{} has no NAME",
                        self.id(),
                        self.steps.len(),
                        i
                    ))
                })?;
                if !seen.insert(name) {
                    return Err(ConfigError::Schema(format!(
                        "Pipeline '{}' has duplicate step name '{}'",
                        self.id(),
                        name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Pick a step
    ///
    /// A single-step pipeline answers [`StepSelector::Default`] with its only
    /// step; a multi-step pipeline requires a name or index.
    pub fn find_step(&self, selector: StepSelector<'_>) -> Result<&StepConfig> {
        match selector {
            StepSelector::Default => match self.steps.as_slice() {
                [only] => Ok(only),
                [] => Err(ConfigError::Invalid(format!(
                    "Pipeline '{}' has no steps",
                    self.id()
                ))),
                steps => Err(ConfigError::Invalid(format!(
                    "Pipeline '{}' has {} steps; a step name is required (one of: {})",
                    self.id(),
                    steps.len(),
                    self.step_names().join(", ")
                ))),
            },
            StepSelector::Named(name) => {
                let mut matches = self.steps.iter().filter(|s| s.name() == Some(name));
                match (matches.next(), matches.next()) {
                    (Some(step), None) => Ok(step),
                    (Some(_), Some(_)) => Err(ConfigError::AmbiguousConfig(format!(
                        "Pipeline '{}' has more than one step named '{}'",
                        self.id(),
                        name
                    ))),
                    (None, _) => Err(ConfigError::not_found(
                        "Step",
                        format!("'{}' in pipeline '{}'", name, self.id()),
                    )),
                }
            }
            StepSelector::Index(i) => self.steps.get(i).ok_or_else(|| {
                ConfigError::not_found(
                    "Step",
                    format!("#{} in pipeline '{}' ({} steps)", i, self.id(), self.steps.len()),
                )
            }),
        }
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().filter_map(StepConfig::name).collect()
    }

    /// Deterministic file stem for derived invocation/descriptor paths:
    /// `name-version`, plus `-step` when the step is named
    pub fn file_stem(&self, step: &StepConfig) -> Result<String> {
        match step.name() {
            Some(step_name) => Ok(format!("{}-{}-{}", self.name, self.version, step_name)),
            None if self.steps.len() > 1 => Err(ConfigError::Invalid(format!(
                "Cannot derive a default file name for an unnamed step of multi-step pipeline '{}'",
                self.id()
            ))),
            None => Ok(format!("{}-{}", self.name, self.version)),
        }
    }
}
