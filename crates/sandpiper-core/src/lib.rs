//! # sandpiper-core
//!
//! Core types shared across Sandpiper crates.
//!
//! This crate provides the tool-facing vocabulary used by every other crate:
//!
//! - **Definitions**: [`ToolDefinition`] describes a tool to the model
//! - **Results**: [`ToolResult`] carries tool output back to the agent loop
//! - **Groups**: [`ToolGroup`] categorizes tools for policy decisions

pub mod types;

// Re-exports for convenience
pub use types::{ToolDefinition, ToolGroup, ToolResult};
