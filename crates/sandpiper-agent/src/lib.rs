//! Tool execution framework for Sandpiper agents.
//!
//! This crate exposes the code execution subsystem to the agent loop as
//! tools: [`CodeExecTool`](tools::CodeExecTool) runs agent-authored code in a
//! disposable container, [`ShellStreamTool`](tools::ShellStreamTool) runs a
//! host shell command with real-time output streaming.

pub mod error;
pub mod tools;

pub use error::AgentError;
pub use tools::{CodeExecTool, ShellStreamTool, Tool, ToolContext, ToolRegistry};

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
