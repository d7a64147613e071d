//! Streaming shell execution tool.
//!
//! - [`ShellStreamTool`] - Execute a host shell command with line streaming

use super::{Tool, ToolContext};
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use sandpiper_core::{ToolDefinition, ToolGroup, ToolResult};
use sandpiper_sandbox::{CommandPolicy, SandboxError, StreamingRunner};
use std::time::Instant;

/// Shell streaming tool - runs a command while collecting output line by line.
///
/// Output is accumulated in emission order per stream (stdout/stderr
/// interleaving is timing-dependent) and capped at a maximum size. A non-zero
/// exit code is normal, reportable output; only spawn/pipe/wait failures are
/// tool errors.
pub struct ShellStreamTool {
    runner: StreamingRunner,
    policy: CommandPolicy,
    max_output_size: usize,
}

impl ShellStreamTool {
    /// Create a new shell streaming tool.
    pub fn new(runner: StreamingRunner) -> Self {
        Self {
            runner,
            policy: CommandPolicy::new(),
            max_output_size: 10 * 1024 * 1024, // 10 MB default
        }
    }

    /// Replace the command policy.
    pub fn with_policy(mut self, policy: CommandPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set maximum output size.
    pub fn with_max_output_size(mut self, size: usize) -> Self {
        self.max_output_size = size;
        self
    }
}

#[async_trait]
impl Tool for ShellStreamTool {
    fn name(&self) -> &str {
        "shell_stream"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "shell_stream".to_string(),
            description: "Execute a shell command, streaming its output as it is produced"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to execute"
                    }
                },
                "required": ["command"]
            }),
        }
    }

    async fn execute(
        &self,
        tool_use_id: &str,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> Result<ToolResult> {
        let start = Instant::now();

        let command = args
            .get("command")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::tool_execution("Missing 'command' argument"))?;

        match self.policy.check(command) {
            Ok(()) => {}
            Err(SandboxError::CommandRejected(_)) => {
                return Ok(ToolResult::error(
                    tool_use_id,
                    "Command is blocked by security policy",
                ));
            }
            Err(e) => return Ok(ToolResult::error(tool_use_id, e.to_string())),
        }

        let mut output = String::new();
        let mut truncated = false;
        let max_output_size = self.max_output_size;
        let exit_code = self
            .runner
            .run_streaming(command, |line| {
                if truncated {
                    return;
                }
                if output.len() + line.text.len() > max_output_size {
                    output.push_str("\n[output truncated]\n");
                    truncated = true;
                    return;
                }
                output.push_str(&line.text);
                output.push('\n');
            })
            .await
            .map_err(AgentError::from)?;

        let result_output = serde_json::json!({
            "output": output,
            "metadata": {
                "command": command,
                "exit_code": exit_code.to_string(),
                "mode": "streaming",
            },
        });

        Ok(ToolResult::success(tool_use_id, result_output).with_duration(start.elapsed()))
    }

    fn requires_approval(&self, args: &serde_json::Value) -> bool {
        if let Some(command) = args.get("command").and_then(|v| v.as_str()) {
            self.policy.is_dangerous(command)
        } else {
            true // Require approval if we can't parse the command
        }
    }

    fn group(&self) -> ToolGroup {
        ToolGroup::System
    }
}
