//! Sandbox error types.

use std::io;
use thiserror::Error;

/// Errors that can occur during sandbox operations.
///
/// A non-zero exit status of the sandboxed program itself is never an error;
/// it is reported through the run result. These variants cover failures of the
/// machinery around the program: validation, process setup, and the container
/// engine.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid request input (empty code, zero timeout, malformed command).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested language is not in the supported set.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Command rejected by the execution policy.
    #[error("Command rejected by policy: {0}")]
    CommandRejected(String),

    /// Failed to obtain stdout/stderr pipes for a child process.
    #[error("Failed to set up process pipes: {0}")]
    Pipe(String),

    /// Failed to start a child process.
    #[error("Failed to start process: {0}")]
    Spawn(String),

    /// Waiting on a child process failed for a reason other than a non-zero
    /// exit status.
    #[error("Failed to wait for process: {0}")]
    Wait(String),

    /// A container engine operation failed.
    #[error("Container runtime error during {stage}: {message}")]
    Runtime {
        /// Lifecycle stage that failed.
        stage: &'static str,
        /// Engine-reported failure.
        message: String,
    },

    /// The request deadline elapsed before the stage completed.
    #[error("Deadline exceeded during {stage} after {timeout_secs}s")]
    DeadlineExceeded {
        /// Lifecycle stage that was cut off.
        stage: &'static str,
        /// Effective timeout in seconds.
        timeout_secs: u64,
    },
}

impl SandboxError {
    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new pipe setup error.
    pub fn pipe(msg: impl Into<String>) -> Self {
        Self::Pipe(msg.into())
    }

    /// Create a new process start error.
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Create a new wait error.
    pub fn wait(msg: impl Into<String>) -> Self {
        Self::Wait(msg.into())
    }

    /// Create a new container runtime error for the given lifecycle stage.
    pub fn runtime(stage: &'static str, msg: impl Into<String>) -> Self {
        Self::Runtime {
            stage,
            message: msg.into(),
        }
    }

    /// Check if this error happened before any process or container existed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnsupportedLanguage(_) | Self::CommandRejected(_)
        )
    }
}
