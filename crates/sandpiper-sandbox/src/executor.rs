//! Sandbox orchestration: request validation and the container lifecycle.

use crate::error::SandboxError;
use crate::language::{wrap_code, Language};
use crate::limits::SandboxLimits;
use crate::runtime::{ContainerRuntime, ContainerSpec};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A validated request to run code in the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxRequest {
    /// Language to execute the code as.
    pub language: Language,

    /// Program body. Must be non-empty.
    pub code: String,

    /// Wall-clock timeout in seconds. Must be positive when present; values
    /// above the configured ceiling are clamped down to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl SandboxRequest {
    /// Create a request with the default timeout.
    pub fn new(language: Language, code: impl Into<String>) -> Self {
        Self {
            language,
            code: code.into(),
            timeout: None,
        }
    }

    /// Set an explicit timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    /// Check the request before any side effect happens.
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(SandboxError::validation("code must not be empty"));
        }
        if self.timeout == Some(0) {
            return Err(SandboxError::validation("timeout must be positive"));
        }
        Ok(())
    }
}

/// Outcome of one completed sandbox run.
///
/// Produced only when the container ran to completion; a non-zero
/// `exit_code` means the sandboxed program failed, not the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxRun {
    /// Combined stdout/stderr logs of the container.
    pub output: String,

    /// Exit code of the containerized program.
    pub exit_code: i64,

    /// Image the code ran in.
    pub image: String,

    /// Invocation command, as a display string.
    pub command: String,

    /// Wall-clock duration of the whole lifecycle in milliseconds.
    pub duration_ms: u64,
}

/// Runs sandbox requests through the container lifecycle.
///
/// The lifecycle is linear: ensure image, create, start, wait, fetch logs,
/// remove. One deadline derived from the request timeout bounds everything
/// from the image pull through the wait; log retrieval and removal
/// deliberately run outside it, so an elapsed deadline can never leave a
/// container behind. Every container created is removed exactly once,
/// regardless of which stage failed.
pub struct SandboxExecutor {
    runtime: Arc<dyn ContainerRuntime>,
    limits: SandboxLimits,
}

impl SandboxExecutor {
    /// Create an executor over the given container runtime.
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            runtime,
            limits: SandboxLimits::default(),
        }
    }

    /// Override the resource limits.
    pub fn with_limits(mut self, limits: SandboxLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the configured limits.
    pub fn limits(&self) -> &SandboxLimits {
        &self.limits
    }

    /// Run a request to completion and return its output and exit code.
    pub async fn run(&self, request: &SandboxRequest) -> Result<SandboxRun> {
        request.validate()?;

        let image = request.language.image();
        let command = wrap_code(request.language, &request.code);
        let spec = ContainerSpec::new(image, command.clone(), &self.limits);

        let timeout = self.limits.effective_timeout(request.timeout);
        let deadline = Instant::now() + timeout;
        let started = Instant::now();

        debug!(
            language = %request.language,
            image,
            timeout_secs = timeout.as_secs(),
            "Running sandbox request"
        );

        bounded(deadline, timeout, "pull_image", self.runtime.ensure_image(image)).await?;

        // Once create succeeds, removal is owed on every subsequent path.
        let id = bounded(
            deadline,
            timeout,
            "create_container",
            self.runtime.create_container(&spec),
        )
        .await?;

        let outcome = async {
            bounded(
                deadline,
                timeout,
                "start_container",
                self.runtime.start_container(&id),
            )
            .await?;
            let exit_code = bounded(
                deadline,
                timeout,
                "wait_container",
                self.runtime.wait_container(&id),
            )
            .await?;
            // The container has stopped; fetching what it printed is not
            // subject to the deadline that bounded its execution.
            let output = self.runtime.logs(&id).await?;
            Ok::<(i64, String), SandboxError>((exit_code, output))
        }
        .await;

        // Best-effort removal on every path, outside the request deadline. A
        // removal failure is logged rather than allowed to mask the outcome.
        if let Err(e) = self.runtime.remove_container(&id).await {
            warn!(container = %id, "Failed to remove sandbox container: {}", e);
        }

        let (exit_code, output) = outcome?;
        debug!(container = %id, exit_code, "Sandbox run complete");

        Ok(SandboxRun {
            output,
            exit_code,
            image: image.to_string(),
            command: command.join(" "),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Run one lifecycle stage under the request deadline.
async fn bounded<T>(
    deadline: Instant,
    timeout: Duration,
    stage: &'static str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(SandboxError::DeadlineExceeded {
            stage,
            timeout_secs: timeout.as_secs(),
        }),
    }
}
