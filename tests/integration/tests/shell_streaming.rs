//! End-to-end streaming shell flows against a real `sh`.

use sandpiper_agent::{ShellStreamTool, Tool, ToolContext};
use sandpiper_sandbox::{OutputSource, StreamingRunner};

fn tool() -> ShellStreamTool {
    ShellStreamTool::new(StreamingRunner::new())
}

#[tokio::test]
async fn test_stdout_order_preserved() {
    let runner = StreamingRunner::new();

    let mut lines = Vec::new();
    let code = runner
        .run_streaming("printf 'a\\nb\\nc\\n'", |line| lines.push(line))
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.source == OutputSource::Stdout));
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_mixed_streams_all_delivered() {
    let runner = StreamingRunner::new();

    let mut lines = Vec::new();
    let code = runner
        .run_streaming("echo out1; echo err1 1>&2; echo out2", |line| {
            lines.push(line)
        })
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(lines.len(), 3);

    let stdout: Vec<_> = lines
        .iter()
        .filter(|l| l.source == OutputSource::Stdout)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(stdout, vec!["out1", "out2"]);

    let stderr: Vec<_> = lines
        .iter()
        .filter(|l| l.source == OutputSource::Stderr)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(stderr, vec!["err1"]);
}

#[tokio::test]
async fn test_tool_reports_exit_code_as_metadata() {
    let args = serde_json::json!({"command": "echo before; exit 3"});
    let result = tool()
        .execute("tu_1", args, &ToolContext::default())
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.output["output"], "before\n");
    assert_eq!(result.output["metadata"]["exit_code"], "3");
    assert_eq!(result.output["metadata"]["mode"], "streaming");
}

#[tokio::test]
async fn test_tool_blocks_policy_violations() {
    let args = serde_json::json!({"command": "sudo id"});
    let result = tool()
        .execute("tu_2", args, &ToolContext::default())
        .await
        .unwrap();

    assert!(result.is_error);
}
