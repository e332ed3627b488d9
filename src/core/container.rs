//! Container configuration and layer merging

use crate::core::placeholder::{PlaceholderResolver, Substitute};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Executable used when no layer names a container command
pub const DEFAULT_CONTAINER_COMMAND: &str = "apptainer";

/// Flags whose following argument is a bind mount specification
const BIND_FLAGS: &[&str] = &["--bind", "-B"];

/// Container launch settings for one configuration layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct ContainerConfig {
    /// Container engine executable (e.g. "apptainer")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Engine arguments; order matters since flags and values are adjacent
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables passed to the container
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,

    /// Whether this layer extends the layer below it or replaces it
    #[serde(default = "default_inherit")]
    pub inherit: bool,
}

fn default_inherit() -> bool {
    true
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            env_vars: BTreeMap::new(),
            inherit: true,
        }
    }
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Append a `--bind local[:inside[:mode]]` argument pair
    pub fn add_bind_path(&mut self, local: &str, inside: Option<&str>, mode: Option<&str>) {
        let mut spec = local.to_string();
        if let Some(inside) = inside {
            spec.push(':');
            spec.push_str(inside);
            if let Some(mode) = mode {
                spec.push(':');
                spec.push_str(mode);
            }
        }
        self.args.push("--bind".to_string());
        self.args.push(spec);
    }

    /// Bind specifications that follow a bind flag in `args`
    pub fn bind_paths(&self) -> Vec<String> {
        bind_paths(&self.args)
    }

    /// Combine `self` (the base layer) with an overriding layer
    ///
    /// - `command`: override wins when set
    /// - `args`: base args followed by override args
    /// - `env_vars`: union, override wins per key
    ///
    /// An override with `inherit: false` replaces the base entirely.
    pub fn merged_with(&self, over: &ContainerConfig) -> ContainerConfig {
        if !over.inherit {
            return over.clone();
        }

        let mut env_vars = self.env_vars.clone();
        env_vars.extend(over.env_vars.iter().map(|(k, v)| (k.clone(), v.clone())));

        ContainerConfig {
            command: over.command.clone().or_else(|| self.command.clone()),
            args: self.args.iter().chain(over.args.iter()).cloned().collect(),
            env_vars,
            inherit: self.inherit,
        }
    }

    /// Merge two optional layers; an absent layer contributes nothing
    pub fn merge(
        base: Option<&ContainerConfig>,
        over: Option<&ContainerConfig>,
    ) -> Option<ContainerConfig> {
        match (base, over) {
            (Some(base), Some(over)) => Some(base.merged_with(over)),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }

    /// Fold layers in order, lowest precedence first
    pub fn merge_layers<'a, I>(layers: I) -> Option<ContainerConfig>
    where
        I: IntoIterator<Item = Option<&'a ContainerConfig>>,
    {
        layers
            .into_iter()
            .fold(None, |acc, layer| ContainerConfig::merge(acc.as_ref(), layer))
    }

    /// Command to run, falling back to [`DEFAULT_CONTAINER_COMMAND`]
    pub fn command_or_default(&self) -> &str {
        self.command.as_deref().unwrap_or(DEFAULT_CONTAINER_COMMAND)
    }
}

impl Substitute for ContainerConfig {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        ContainerConfig {
            command: self.command.substitute(resolver),
            args: self.args.substitute(resolver),
            env_vars: self.env_vars.substitute(resolver),
            inherit: self.inherit,
        }
    }
}

/// Accepts `--bind SPEC`, `-B SPEC` and `--bind=SPEC`
pub(crate) fn bind_paths(args: &[String]) -> Vec<String> {
    let mut paths = Vec::new();
    let mut args = args.iter().peekable();
    while let Some(arg) = args.next() {
        if let Some(spec) = arg.strip_prefix("--bind=") {
            paths.push(spec.to_string());
        } else if BIND_FLAGS.contains(&arg.as_str()) {
            if let Some(spec) = args.next_if(|next| !next.starts_with('-')) {
                paths.push(spec.clone());
            }
        }
    }
    paths
}

/// Where a pipeline's container image lives and where it comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct ContainerInfo {
    /// Path template for the local image file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Source URI template (e.g. `docker://nipreps/fmriprep:[[PIPELINE_VERSION]]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Substitute for ContainerInfo {
    fn substitute(&self, resolver: &PlaceholderResolver<'_>) -> Self {
        ContainerInfo {
            file: self.file.substitute(resolver),
            uri: self.uri.substitute(resolver),
        }
    }
}
