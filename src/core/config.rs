//! Dataset-wide configuration loaded from JSON or YAML

use crate::core::{
    container::ContainerConfig,
    error::{ConfigError, Result},
    pipeline::{PipelineConfig, PipelineKind},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Top-level global configuration
///
/// Unknown keys are rejected at every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct GlobalConfig {
    pub dataset_name: String,

    #[serde(default)]
    pub visits: Vec<String>,

    /// Falls back to `visits` when omitted, see [`GlobalConfig::sessions`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<String>>,

    /// User-defined `[[TOKEN]] -> value` substitutions
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,

    /// Container defaults shared by every pipeline
    #[serde(default)]
    pub container_config: ContainerConfig,

    #[serde(default)]
    pub bids_pipelines: Vec<PipelineConfig>,

    #[serde(default)]
    pub proc_pipelines: Vec<PipelineConfig>,

    /// Opaque pipeline-specific extension data
    #[serde(default)]
    pub custom: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

impl GlobalConfig {
    /// Minimal config with no pipelines
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            visits: Vec::new(),
            sessions: None,
            substitutions: BTreeMap::new(),
            container_config: ContainerConfig::default(),
            bids_pipelines: Vec::new(),
            proc_pipelines: Vec::new(),
            custom: Map::new(),
        }
    }

    /// Load and validate a config file; `.yaml`/`.yml` are read as YAML,
    /// anything else as JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading global config from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = match Format::for_path(path) {
            Format::Yaml => Self::from_yaml(&content),
            Format::Json => Self::from_json(&content),
        };
        parsed.map_err(|e| match e {
            ConfigError::Schema(msg) => {
                ConfigError::Schema(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: GlobalConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Schema(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GlobalConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Schema(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config back out, pretty JSON or YAML by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match Format::for_path(path) {
            Format::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ConfigError::Schema(e.to_string()))?
            }
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Schema(e.to_string()))?,
        };

        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)?;

        debug!("Saved global config to {}", path.display());
        Ok(())
    }

    /// Semantic checks that serde cannot express
    pub fn validate(&self) -> Result<()> {
        check_unique("VISITS", &self.visits)?;
        if let Some(sessions) = &self.sessions {
            check_unique("SESSIONS", sessions)?;
        }

        if self.substitutions.keys().any(|k| k.is_empty()) {
            return Err(ConfigError::Schema(
                "SUBSTITUTIONS keys must be non-empty".to_string(),
            ));
        }

        for (label, collection) in [
            ("BIDS_PIPELINES", &self.bids_pipelines),
            ("PROC_PIPELINES", &self.proc_pipelines),
        ] {
            let mut seen = HashSet::new();
            for pipeline in collection {
                pipeline.validate()?;
                if !seen.insert((pipeline.name.as_str(), pipeline.version.as_str())) {
                    return Err(ConfigError::Schema(format!(
                        "Duplicate pipeline '{}' in {}",
                        pipeline.id(),
                        label
                    )));
                }
            }
        }

        Ok(())
    }

    /// Session labels, defaulting to the visit labels
    pub fn sessions(&self) -> &[String] {
        self.sessions.as_deref().unwrap_or(&self.visits)
    }

    /// All pipelines, BIDS conversion first
    pub fn pipelines(&self) -> impl Iterator<Item = (PipelineKind, &PipelineConfig)> {
        self.bids_pipelines
            .iter()
            .map(|p| (PipelineKind::Bids, p))
            .chain(self.proc_pipelines.iter().map(|p| (PipelineKind::Proc, p)))
    }

    /// Exact (name, version) lookup across both collections
    pub fn find_pipeline(&self, name: &str, version: &str) -> Result<&PipelineConfig> {
        self.find_pipeline_with_kind(name, version)
            .map(|(_, pipeline)| pipeline)
    }

    /// Like [`GlobalConfig::find_pipeline`], also reporting the collection
    pub fn find_pipeline_with_kind(
        &self,
        name: &str,
        version: &str,
    ) -> Result<(PipelineKind, &PipelineConfig)> {
        let mut matches = self.pipelines().filter(|(_, p)| p.matches(name, version));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found),
            (Some((first, _)), Some((second, _))) => Err(ConfigError::AmbiguousConfig(format!(
                "Pipeline '{} {}' is defined more than once ({} and {})",
                name, version, first, second
            ))),
            (None, _) => Err(ConfigError::not_found(
                "Pipeline",
                format!("{} {}", name, version),
            )),
        }
    }

    /// First listed version of pipeline `name`
    pub fn default_pipeline_version(&self, name: &str) -> Result<&str> {
        self.pipelines()
            .find(|(_, p)| p.name == name)
            .map(|(_, p)| p.version.as_str())
            .ok_or_else(|| ConfigError::not_found("Pipeline", name))
    }

    /// Versions of pipeline `name`, in document order
    pub fn pipeline_versions(&self, name: &str) -> Vec<&str> {
        self.pipelines()
            .filter(|(_, p)| p.name == name)
            .map(|(_, p)| p.version.as_str())
            .collect()
    }
}

fn check_unique(label: &str, values: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(ConfigError::Schema(format!(
                "Duplicate entry '{}' in {}",
                value, label
            )));
        }
    }
    Ok(())
}
