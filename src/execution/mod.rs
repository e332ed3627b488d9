//! Invocation resolution and container execution

pub mod resolver;
pub mod runner;

pub use resolver::{resolve_invocation, InvocationResolver, ResolvedInvocation};
pub use runner::{render_command_line, ContainerRunner, RunOutcome, RunnerError, SubprocessRunner};
