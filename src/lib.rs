//! neuropipe - pipeline configuration resolution for neuroimaging datasets

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, ContainerConfig, GlobalConfig, PipelineConfig, StepConfig, StepSelector,
    TokenContext,
};
pub use crate::execution::{
    resolve_invocation, ContainerRunner, InvocationResolver, ResolvedInvocation, RunOutcome,
    SubprocessRunner,
};
