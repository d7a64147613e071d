//! Isolated, resource-bounded code execution for Sandpiper agents.
//!
//! This crate provides the two execution paths behind Sandpiper's code tools:
//! - Container sandbox: runs untrusted, agent-authored code to completion in a
//!   disposable container with memory/CPU/pids ceilings, no network access, and
//!   a wall-clock deadline
//! - Streaming shell: runs a host shell command while delivering stdout/stderr
//!   lines to a caller in real time
//!
//! Both paths guarantee cleanup on every exit path: every sandbox container
//! created is removed exactly once, and the streaming runner never leaves an
//! orphaned child process behind.

pub mod error;
pub mod executor;
pub mod language;
pub mod limits;
pub mod policy;
pub mod runner;
pub mod runtime;
pub mod stream;

pub use error::SandboxError;
pub use executor::{SandboxExecutor, SandboxRequest, SandboxRun};
pub use language::Language;
pub use limits::SandboxLimits;
pub use policy::CommandPolicy;
pub use runner::{ProcessSpawner, ShellSpawner, StreamingRunner};
pub use runtime::{ContainerRuntime, ContainerSpec, DockerRuntime};
pub use stream::{OutputLine, OutputSource};

/// Result type for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;
