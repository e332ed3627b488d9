//! Error types for configuration loading and resolution

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a global config or resolving an invocation
///
/// Resolution is deterministic, so none of these are worth retrying without
/// changing the configuration or the lookup keys.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document failed structural or type validation on load
    #[error("Schema error: {0}")]
    Schema(String),

    /// A pipeline, version or step lookup missed
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// More than one entry matched a lookup that must be unique
    #[error("Ambiguous configuration: {0}")]
    AmbiguousConfig(String),

    /// Structurally valid, but unusable for the requested resolution
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Placeholder tokens survived substitution
    #[error("Unresolved placeholders for {context}: {}", .tokens.join(", "))]
    UnresolvedPlaceholders { context: String, tokens: Vec<String> },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        ConfigError::NotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
