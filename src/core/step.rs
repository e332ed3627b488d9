//! Step configuration and step selection

use crate::core::container::ContainerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One ordered stage of a pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct StepConfig {
    /// Step name; required when the pipeline has more than one step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Invocation file path template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_file: Option<String>,

    /// Tool descriptor file path template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor_file: Option<String>,

    /// Container overrides for this step only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_config: Option<ContainerConfig>,
}

impl StepConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// How a caller picks a step out of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepSelector<'a> {
    /// The pipeline's only step; rejected for multi-step pipelines
    #[default]
    Default,
    /// Exact step name
    Named(&'a str),
    /// Zero-based position in the step list
    Index(usize),
}

impl<'a> From<Option<&'a str>> for StepSelector<'a> {
    fn from(name: Option<&'a str>) -> Self {
        name.map_or(StepSelector::Default, StepSelector::Named)
    }
}

impl<'a> From<&'a str> for StepSelector<'a> {
    fn from(name: &'a str) -> Self {
        StepSelector::Named(name)
    }
}

impl fmt::Display for StepSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSelector::Default => write!(f, "<default>"),
            StepSelector::Named(name) => write!(f, "{}", name),
            StepSelector::Index(i) => write!(f, "#{}", i),
        }
    }
}
