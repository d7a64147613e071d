//! Shared test doubles for the integration test binaries.

use async_trait::async_trait;
use sandpiper_sandbox::{ContainerRuntime, ContainerSpec, SandboxError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Container runtime fake that scripts an exit code and canned logs, and
/// records how often each lifecycle operation ran.
pub struct ScriptedRuntime {
    pub exit_code: i64,
    pub logs: String,
    pub fail_stage: Option<&'static str>,
    creates: AtomicUsize,
    removes: AtomicUsize,
    total_calls: AtomicUsize,
}

impl ScriptedRuntime {
    /// A runtime where every stage succeeds.
    pub fn succeeding(exit_code: i64, logs: impl Into<String>) -> Self {
        Self {
            exit_code,
            logs: logs.into(),
            fail_stage: None,
            creates: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
            total_calls: AtomicUsize::new(0),
        }
    }

    /// A runtime that fails at the named lifecycle stage.
    pub fn failing_at(stage: &'static str) -> Self {
        Self {
            fail_stage: Some(stage),
            ..Self::succeeding(0, "")
        }
    }

    fn record(&self, stage: &'static str) -> Result<(), SandboxError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stage == Some(stage) {
            return Err(SandboxError::runtime(stage, "scripted failure"));
        }
        Ok(())
    }

    /// Number of containers created.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of remove calls.
    pub fn remove_count(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// Total calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn ensure_image(&self, _image: &str) -> Result<(), SandboxError> {
        self.record("pull_image")
    }

    async fn create_container(&self, _spec: &ContainerSpec) -> Result<String, SandboxError> {
        self.record("create_container")?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok("scripted-container".to_string())
    }

    async fn start_container(&self, _id: &str) -> Result<(), SandboxError> {
        self.record("start_container")
    }

    async fn wait_container(&self, _id: &str) -> Result<i64, SandboxError> {
        self.record("wait_container")?;
        Ok(self.exit_code)
    }

    async fn logs(&self, _id: &str) -> Result<String, SandboxError> {
        self.record("fetch_logs")?;
        Ok(self.logs.clone())
    }

    async fn remove_container(&self, _id: &str) -> Result<(), SandboxError> {
        self.record("remove_container")?;
        self.removes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
