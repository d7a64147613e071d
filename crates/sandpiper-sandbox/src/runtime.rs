//! Container runtime seam and the Docker-backed adapter.

use crate::error::SandboxError;
use crate::limits::SandboxLimits;
use crate::Result;
use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, LogsOptionsBuilder,
    RemoveContainerOptionsBuilder, StartContainerOptions, WaitContainerOptions,
};
use bollard::Docker;
use futures::{StreamExt, TryStreamExt};
use uuid::Uuid;

/// Creation-time configuration for one sandbox container.
///
/// Every spec carries non-zero memory/CPU/pids ceilings and has networking
/// disabled; there is no constructor that produces an unbounded or networked
/// container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Image to run.
    pub image: String,

    /// Argv executed inside the container.
    pub command: Vec<String>,

    /// Memory ceiling in bytes.
    pub memory_bytes: u64,

    /// CPU ceiling in units of 1e-9 CPUs.
    pub nano_cpus: u64,

    /// Process-count ceiling.
    pub pids_limit: u64,

    /// Always true for sandbox execution.
    pub network_disabled: bool,
}

impl ContainerSpec {
    /// Build a spec from an image, an in-container argv, and resource limits.
    pub fn new(image: impl Into<String>, command: Vec<String>, limits: &SandboxLimits) -> Self {
        Self {
            image: image.into(),
            command,
            memory_bytes: limits.memory_bytes,
            nano_cpus: limits.nano_cpus,
            pids_limit: limits.pids,
            network_disabled: true,
        }
    }
}

/// Operations the sandbox lifecycle needs from a container engine.
///
/// Production uses [`DockerRuntime`]; tests substitute fakes that record call
/// counts and script failures per stage.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Make sure `image` is available locally, pulling it if absent.
    async fn ensure_image(&self, image: &str) -> Result<()>;

    /// Create a container and return its engine-assigned identifier.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container.
    async fn start_container(&self, id: &str) -> Result<()>;

    /// Block until the container exits and return its exit code.
    ///
    /// A non-zero exit code of the containerized program is a normal return
    /// value, not an error.
    async fn wait_container(&self, id: &str) -> Result<i64>;

    /// Fetch the container's combined stdout/stderr logs.
    async fn logs(&self, id: &str) -> Result<String>;

    /// Remove the container. Removing an already-removed container is not an
    /// error.
    async fn remove_container(&self, id: &str) -> Result<()>;
}

/// [`ContainerRuntime`] backed by a local Docker daemon.
///
/// The underlying client is cheap to clone and safe to share across
/// concurrent sandbox runs; each run owns its own container identifier.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the local Docker daemon using the platform defaults.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| SandboxError::runtime("connect", e.to_string()))?;
        Ok(Self { docker })
    }

    /// Wrap an existing client.
    pub fn from_client(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ensure_image(&self, image: &str) -> Result<()> {
        if self.docker.inspect_image(image).await.is_ok() {
            return Ok(());
        }

        let (from_image, tag) = match image.rsplit_once(':') {
            Some((img, tag)) => (img, tag),
            None => (image, "latest"),
        };
        self.docker
            .create_image(
                Some(
                    CreateImageOptionsBuilder::new()
                        .from_image(from_image)
                        .tag(tag)
                        .build(),
                ),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| SandboxError::runtime("pull_image", e.to_string()))?;
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let name = format!("sandpiper-{}", Uuid::new_v4());
        let body = ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            network_disabled: Some(spec.network_disabled),
            host_config: Some(HostConfig {
                memory: Some(spec.memory_bytes as i64),
                nano_cpus: Some(spec.nano_cpus as i64),
                pids_limit: Some(spec.pids_limit as i64),
                network_mode: Some("none".to_string()),
                ..HostConfig::default()
            }),
            ..ContainerCreateBody::default()
        };

        let response = self
            .docker
            .create_container(
                Some(CreateContainerOptionsBuilder::new().name(&name).build()),
                body,
            )
            .await
            .map_err(|e| SandboxError::runtime("create_container", e.to_string()))?;
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(|e| SandboxError::runtime("start_container", e.to_string()))
    }

    async fn wait_container(&self, id: &str) -> Result<i64> {
        let wait = self
            .docker
            .wait_container(id, None::<WaitContainerOptions>);
        futures::pin_mut!(wait);

        match wait.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // The engine reports a non-zero exit status as an error; translate
            // it back into a plain exit code, since a failing sandboxed
            // program is expected output rather than an infrastructure fault.
            Some(Err(BollardError::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(SandboxError::runtime("wait_container", e.to_string())),
            None => Err(SandboxError::runtime(
                "wait_container",
                "wait stream ended without a status",
            )),
        }
    }

    async fn logs(&self, id: &str) -> Result<String> {
        let chunks: Vec<LogOutput> = self
            .docker
            .logs(
                id,
                Some(
                    LogsOptionsBuilder::new()
                        .stdout(true)
                        .stderr(true)
                        .build(),
                ),
            )
            .try_collect()
            .await
            .map_err(|e| SandboxError::runtime("fetch_logs", e.to_string()))?;

        let mut output = String::new();
        for chunk in chunks {
            output.push_str(&String::from_utf8_lossy(&chunk.into_bytes()));
        }
        Ok(output)
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        match self
            .docker
            .remove_container(
                id,
                Some(
                    RemoveContainerOptionsBuilder::new()
                        .force(true)
                        .v(true)
                        .build(),
                ),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(SandboxError::runtime("remove_container", e.to_string())),
        }
    }
}

fn is_not_found(error: &BollardError) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError { status_code, .. } if *status_code == 404
    )
}
