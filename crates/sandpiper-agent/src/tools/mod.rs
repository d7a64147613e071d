//! Tool execution framework and built-in tools.
//!
//! This module provides:
//! - [`Tool`] trait for implementing tools
//! - [`ToolRegistry`] for managing available tools
//! - Built-in tools for sandboxed and streaming code execution

mod code;
mod shell;

pub use code::CodeExecTool;
pub use shell::ShellStreamTool;

use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use sandpiper_core::{ToolDefinition, ToolGroup, ToolResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A tool that can be executed by an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get the tool definition for the model.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given arguments.
    async fn execute(
        &self,
        tool_use_id: &str,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult>;

    /// Check if the tool requires approval.
    fn requires_approval(&self, _args: &serde_json::Value) -> bool {
        false
    }

    /// Get the tool group.
    fn group(&self) -> ToolGroup {
        ToolGroup::Custom
    }
}

/// Context for tool execution.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Working directory.
    pub cwd: std::path::PathBuf,

    /// Environment variables.
    pub env: HashMap<String, String>,

    /// Session ID.
    pub session_id: String,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("/")),
            env: std::env::vars().collect(),
            session_id: String::new(),
        }
    }
}

/// Registry for available tools.
pub struct ToolRegistry {
    /// Registered tools by name.
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,

    /// Tool groups.
    groups: RwLock<HashMap<ToolGroup, Vec<String>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool.
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let group = tool.group();

        let mut tools = self.tools.write().await;
        tools.insert(name.clone(), tool);

        let mut groups = self.groups.write().await;
        groups.entry(group).or_default().push(name);
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all tool names.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        tools.keys().cloned().collect()
    }

    /// List tools in a group.
    pub async fn list_group(&self, group: ToolGroup) -> Vec<String> {
        let groups = self.groups.read().await;
        groups.get(&group).cloned().unwrap_or_default()
    }

    /// Get all tool definitions.
    pub async fn definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        tools.values().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        tool_use_id: &str,
        name: &str,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .await
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        debug!("Executing tool '{}' with args: {:?}", name, args);
        tool.execute(tool_use_id, args, context).await
    }
}
