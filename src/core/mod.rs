//! Core domain models
//!
//! Typed configuration layers (global, pipeline, step, container), the
//! placeholder substitution engine and the token context built from them.

pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod placeholder;
pub mod step;

pub use config::GlobalConfig;
pub use container::{ContainerConfig, ContainerInfo, DEFAULT_CONTAINER_COMMAND};
pub use context::{ResolutionContext, Subject};
pub use error::ConfigError;
pub use layout::DatasetLayout;
pub use pipeline::{PipelineConfig, PipelineKind};
pub use placeholder::{resolve, PlaceholderResolver, Substitute, TokenContext};
pub use step::{StepConfig, StepSelector};
