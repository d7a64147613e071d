//! Streaming execution of host shell commands.

use crate::error::SandboxError;
use crate::stream::{multiplex_lines, OutputLine};
use crate::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tracing::debug;

/// A started child process, reduced to what the runner needs: its two output
/// streams and a way to wait for it.
pub struct ChildStreams {
    /// Standard output pipe.
    pub stdout: Box<dyn AsyncRead + Unpin + Send>,

    /// Standard error pipe.
    pub stderr: Box<dyn AsyncRead + Unpin + Send>,

    /// Handle used to collect the exit status.
    pub waiter: Box<dyn ProcessWait>,
}

/// Waits for a started process to exit.
#[async_trait]
pub trait ProcessWait: Send {
    /// Block until the process exits and return its exit code.
    ///
    /// A non-zero exit status is a normal return value here, never an error;
    /// [`SandboxError::Wait`] is reserved for failures of the wait itself.
    async fn wait(&mut self) -> Result<i32>;
}

/// Starts a shell command and hands back its streams.
///
/// This is the seam between the runner and the operating system: production
/// code uses [`ShellSpawner`], tests substitute a fake that produces scripted
/// streams and exit codes.
pub trait ProcessSpawner: Send + Sync {
    /// Start `command` and return its output streams and wait handle.
    fn spawn(&self, command: &str) -> Result<ChildStreams>;
}

/// Production spawner: runs commands via `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellSpawner;

impl ShellSpawner {
    /// Create a new shell spawner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for ShellSpawner {
    fn spawn(&self, command: &str) -> Result<ChildStreams> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SandboxError::spawn(format!("Failed to spawn command: {}", e)))?;

        // Both pipes were requested above, so these are present on every
        // platform we target; if one is somehow missing, the child must not
        // be left running.
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.start_kill();
                return Err(SandboxError::pipe("stdout pipe unavailable"));
            }
        };
        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                let _ = child.start_kill();
                return Err(SandboxError::pipe("stderr pipe unavailable"));
            }
        };

        Ok(ChildStreams {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            waiter: Box::new(TokioChildWait { child }),
        })
    }
}

struct TokioChildWait {
    child: tokio::process::Child,
}

#[async_trait]
impl ProcessWait for TokioChildWait {
    async fn wait(&mut self) -> Result<i32> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| SandboxError::wait(format!("Failed to wait for command: {}", e)))?;

        // code() is None when the process was killed by a signal.
        Ok(status.code().unwrap_or(-1))
    }
}

/// Executes one shell command to completion while streaming its output.
pub struct StreamingRunner {
    spawner: Box<dyn ProcessSpawner>,
}

impl Default for StreamingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingRunner {
    /// Create a runner backed by the production [`ShellSpawner`].
    pub fn new() -> Self {
        Self::with_spawner(Box::new(ShellSpawner::new()))
    }

    /// Create a runner backed by a custom spawner.
    pub fn with_spawner(spawner: Box<dyn ProcessSpawner>) -> Self {
        Self { spawner }
    }

    /// Run `command` to completion, delivering every output line to `on_line`
    /// as it is produced, and return the process exit code.
    ///
    /// Both output streams are fully drained BEFORE waiting on the process;
    /// waiting first can lose buffered output when the process exits and its
    /// pipes close. A non-zero exit code is returned as a value, not an error:
    /// errors mean the command could not be run at all, a non-zero code means
    /// it ran and failed.
    pub async fn run_streaming<F>(&self, command: &str, on_line: F) -> Result<i32>
    where
        F: FnMut(OutputLine) + Send,
    {
        debug!("Executing command: {}", command);

        let mut child = self.spawner.spawn(command)?;

        multiplex_lines(child.stdout, child.stderr, on_line).await;

        let exit_code = child.waiter.wait().await?;
        debug!("Command exited with code {}", exit_code);
        Ok(exit_code)
    }
}
