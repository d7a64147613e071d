//! End-to-end sandbox tool flows over a scripted container runtime.
//!
//! These tests drive the `code_exec` tool through the registry the way the
//! agent loop does, and verify the lifecycle guarantees: validation happens
//! before any engine call, and every created container is removed exactly
//! once no matter how the run ends.

use sandpiper_agent::{CodeExecTool, Tool, ToolContext, ToolRegistry};
use sandpiper_integration_tests::ScriptedRuntime;
use sandpiper_sandbox::SandboxExecutor;
use std::sync::Arc;

fn registry_tool(runtime: Arc<ScriptedRuntime>) -> CodeExecTool {
    CodeExecTool::new(Arc::new(SandboxExecutor::new(runtime)))
}

#[tokio::test]
async fn test_python_run_through_registry() {
    let runtime = Arc::new(ScriptedRuntime::succeeding(0, "2\n"));
    let registry = ToolRegistry::new();
    registry
        .register(Arc::new(registry_tool(Arc::clone(&runtime))))
        .await;

    let args = serde_json::json!({
        "language": "python",
        "code": "print(1+1)",
        "timeout": 5,
    });
    let result = registry
        .execute("tu_1", "code_exec", args, &ToolContext::default())
        .await
        .unwrap();

    assert!(!result.is_error);
    assert!(result.output["output"].as_str().unwrap().contains('2'));
    assert_eq!(result.output["metadata"]["image"], "python:3-slim");
    assert_eq!(result.output["metadata"]["exit_code"], "0");
    assert_eq!(runtime.create_count(), 1);
    assert_eq!(runtime.remove_count(), 1);
}

#[tokio::test]
async fn test_unsupported_language_never_reaches_engine() {
    let runtime = Arc::new(ScriptedRuntime::succeeding(0, ""));
    let tool = registry_tool(Arc::clone(&runtime));

    let args = serde_json::json!({"language": "ruby", "code": "puts 1"});
    let result = tool
        .execute("tu_2", args, &ToolContext::default())
        .await
        .unwrap();

    assert!(result.is_error);
    assert_eq!(runtime.total_calls(), 0);
}

#[tokio::test]
async fn test_failing_program_reports_exit_code() {
    let runtime = Arc::new(ScriptedRuntime::succeeding(7, "Traceback...\n"));
    let tool = registry_tool(Arc::clone(&runtime));

    let args = serde_json::json!({"language": "python", "code": "raise SystemExit(7)"});
    let result = tool
        .execute("tu_3", args, &ToolContext::default())
        .await
        .unwrap();

    // A sandboxed program failing is informative output, not a tool error.
    assert!(!result.is_error);
    assert_eq!(result.output["metadata"]["exit_code"], "7");
    assert_eq!(runtime.remove_count(), 1);
}

#[tokio::test]
async fn test_start_failure_is_tool_error_but_container_removed() {
    let runtime = Arc::new(ScriptedRuntime::failing_at("start_container"));
    let tool = registry_tool(Arc::clone(&runtime));

    let args = serde_json::json!({"language": "bash", "code": "echo hi"});
    let result = tool.execute("tu_4", args, &ToolContext::default()).await;

    assert!(result.is_err());
    assert_eq!(runtime.create_count(), 1);
    assert_eq!(runtime.remove_count(), 1);
}

#[tokio::test]
async fn test_pull_failure_owes_no_cleanup() {
    let runtime = Arc::new(ScriptedRuntime::failing_at("pull_image"));
    let tool = registry_tool(Arc::clone(&runtime));

    let args = serde_json::json!({"language": "javascript", "code": "console.log(1)"});
    let result = tool.execute("tu_5", args, &ToolContext::default()).await;

    assert!(result.is_err());
    assert_eq!(runtime.create_count(), 0);
    assert_eq!(runtime.remove_count(), 0);
}
