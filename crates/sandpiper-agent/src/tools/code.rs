//! Sandboxed code execution tool.
//!
//! - [`CodeExecTool`] - Run agent-authored code in a disposable container

use super::{Tool, ToolContext};
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use sandpiper_core::{ToolDefinition, ToolGroup, ToolResult};
use sandpiper_sandbox::{Language, SandboxError, SandboxExecutor, SandboxRequest};
use std::sync::Arc;
use std::time::Instant;

/// Code execution tool - runs code in an isolated, resource-bounded container.
///
/// The sandboxed program's own failure (a non-zero exit code) is reported as
/// successful tool output carrying the exit code in metadata; only
/// infrastructure failures (image pull, create/start, deadline) surface as
/// tool errors.
pub struct CodeExecTool {
    executor: Arc<SandboxExecutor>,
}

impl CodeExecTool {
    /// Create a new code execution tool over a sandbox executor.
    pub fn new(executor: Arc<SandboxExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for CodeExecTool {
    fn name(&self) -> &str {
        "code_exec"
    }

    fn definition(&self) -> ToolDefinition {
        let limits = self.executor.limits();
        ToolDefinition {
            name: "code_exec".to_string(),
            description: "Execute code in an isolated sandbox container with no network access"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "language": {
                        "type": "string",
                        "enum": ["python", "bash", "javascript"],
                        "description": "Language to execute the code as"
                    },
                    "code": {
                        "type": "string",
                        "description": "The code to execute"
                    },
                    "timeout": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": limits.max_timeout_secs,
                        "description": format!(
                            "Timeout in seconds (default: {}, max: {})",
                            limits.default_timeout_secs, limits.max_timeout_secs
                        )
                    }
                },
                "required": ["language", "code"]
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

        let language = args
            .get("language")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::tool_execution("Missing 'language' argument"))?;
        let code = args
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::tool_execution("Missing 'code' argument"))?;
        let timeout = args.get("timeout").and_then(|v| v.as_u64());

        // Resolve the language before anything touches the container engine.
        let language: Language = match language.parse() {
            Ok(language) => language,
            Err(SandboxError::UnsupportedLanguage(l)) => {
                return Ok(ToolResult::error(
                    tool_use_id,
                    format!("Unsupported language: {}", l),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let mut request = SandboxRequest::new(language, code);
        request.timeout = timeout;

        match self.executor.run(&request).await {
            Ok(run) => {
                let output = serde_json::json!({
                    "output": run.output,
                    "metadata": {
                        "language": language.as_str(),
                        "image": run.image,
                        "command": run.command,
                        "exit_code": run.exit_code.to_string(),
                    },
                });
                Ok(ToolResult::success(tool_use_id, output).with_duration(start.elapsed()))
            }
            Err(e) if e.is_validation() => Ok(ToolResult::error(tool_use_id, e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn group(&self) -> ToolGroup {
        ToolGroup::Sandbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sandpiper_sandbox::{ContainerRuntime, ContainerSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake runtime that records calls and prints a canned result.
    struct CountingRuntime {
        exit_code: i64,
        calls: AtomicUsize,
        removes: AtomicUsize,
    }

    impl CountingRuntime {
        fn new(exit_code: i64) -> Self {
            Self {
                exit_code,
                calls: AtomicUsize::new(0),
                removes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContainerRuntime for CountingRuntime {
        async fn ensure_image(&self, _image: &str) -> sandpiper_sandbox::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn create_container(&self, _spec: &ContainerSpec) -> sandpiper_sandbox::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("ctr".into())
        }
        async fn start_container(&self, _id: &str) -> sandpiper_sandbox::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn wait_container(&self, _id: &str) -> sandpiper_sandbox::Result<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.exit_code)
        }
        async fn logs(&self, _id: &str) -> sandpiper_sandbox::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("2\n".into())
        }
        async fn remove_container(&self, _id: &str) -> sandpiper_sandbox::Result<()> {
            self.removes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn tool(runtime: Arc<CountingRuntime>) -> CodeExecTool {
        CodeExecTool::new(Arc::new(SandboxExecutor::new(runtime)))
    }

    #[tokio::test]
    async fn test_successful_execution() {
        let runtime = Arc::new(CountingRuntime::new(0));
        let tool = tool(Arc::clone(&runtime));

        let args = serde_json::json!({
            "language": "python",
            "code": "print(1+1)",
            "timeout": 5,
        });
        let result = tool.execute("tu_1", args, &ToolContext::default()).await.unwrap();

        assert!(!result.is_error);
        assert!(result.output["output"].as_str().unwrap().contains('2'));
        assert_eq!(result.output["metadata"]["language"], "python");
        assert_eq!(result.output["metadata"]["image"], "python:3-slim");
        assert_eq!(result.output["metadata"]["exit_code"], "0");
        assert_eq!(runtime.removes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_successful_output() {
        let runtime = Arc::new(CountingRuntime::new(1));
        let tool = tool(runtime);

        let args = serde_json::json!({"language": "bash", "code": "exit 1"});
        let result = tool.execute("tu_2", args, &ToolContext::default()).await.unwrap();

        assert!(!result.is_error);
        assert_eq!(result.output["metadata"]["exit_code"], "1");
        assert_eq!(result.output["metadata"]["language"], "bash");
    }

    #[tokio::test]
    async fn test_unsupported_language_makes_no_runtime_calls() {
        let runtime = Arc::new(CountingRuntime::new(0));
        let tool = tool(Arc::clone(&runtime));

        let args = serde_json::json!({"language": "ruby", "code": "puts 1"});
        let result = tool.execute("tu_3", args, &ToolContext::default()).await.unwrap();

        assert!(result.is_error);
        assert_eq!(runtime.calls.load(Ordering::SeqCst), 0);
        assert_eq!(runtime.removes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_code_is_recoverable_error() {
        let runtime = Arc::new(CountingRuntime::new(0));
        let tool = tool(Arc::clone(&runtime));

        let args = serde_json::json!({"language": "python", "code": ""});
        let result = tool.execute("tu_4", args, &ToolContext::default()).await.unwrap();

        assert!(result.is_error);
        assert_eq!(runtime.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let runtime = Arc::new(CountingRuntime::new(0));
        let tool = tool(runtime);

        let args = serde_json::json!({"language": "python"});
        let result = tool.execute("tu_5", args, &ToolContext::default()).await;
        assert!(matches!(result, Err(AgentError::ToolExecution(_))));
    }
}
