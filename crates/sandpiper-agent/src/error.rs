//! Agent error types.

use std::io;
use thiserror::Error;

/// Errors that can occur during agent tool operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tool not found.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution error.
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// Sandbox error.
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Create a tool execution error.
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<sandpiper_sandbox::SandboxError> for AgentError {
    fn from(e: sandpiper_sandbox::SandboxError) -> Self {
        Self::Sandbox(e.to_string())
    }
}
