//! Resource limits for sandbox containers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resource limits applied to every sandbox container.
///
/// There is no way to lift these per request: requests can only shorten the
/// wall-clock timeout, never exceed [`max_timeout_secs`](Self::max_timeout_secs),
/// and never touch memory/CPU/pids or re-enable networking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxLimits {
    /// Maximum memory in bytes.
    #[serde(default = "default_memory")]
    pub memory_bytes: u64,

    /// CPU ceiling in units of 1e-9 CPUs (500_000_000 = half a core).
    #[serde(default = "default_nano_cpus")]
    pub nano_cpus: u64,

    /// Maximum number of processes.
    #[serde(default = "default_pids")]
    pub pids: u64,

    /// Wall-clock timeout applied when the request does not specify one.
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,

    /// Hard ceiling on the wall-clock timeout a request may ask for.
    #[serde(default = "default_max_timeout")]
    pub max_timeout_secs: u64,
}

fn default_memory() -> u64 {
    64 * 1024 * 1024 // 64 MiB
}

fn default_nano_cpus() -> u64 {
    500_000_000 // 0.5 core
}

fn default_pids() -> u64 {
    64
}

fn default_timeout() -> u64 {
    10
}

fn default_max_timeout() -> u64 {
    30
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            memory_bytes: default_memory(),
            nano_cpus: default_nano_cpus(),
            pids: default_pids(),
            default_timeout_secs: default_timeout(),
            max_timeout_secs: default_max_timeout(),
        }
    }
}

impl SandboxLimits {
    /// Create new limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to set the memory limit.
    pub fn with_memory(mut self, bytes: u64) -> Self {
        self.memory_bytes = bytes;
        self
    }

    /// Builder-style method to set the CPU ceiling.
    pub fn with_nano_cpus(mut self, nano_cpus: u64) -> Self {
        self.nano_cpus = nano_cpus;
        self
    }

    /// Builder-style method to set the process limit.
    pub fn with_pids(mut self, pids: u64) -> Self {
        self.pids = pids;
        self
    }

    /// Builder-style method to set the default timeout.
    pub fn with_default_timeout(mut self, secs: u64) -> Self {
        self.default_timeout_secs = secs;
        self
    }

    /// Resolve the wall-clock deadline for a request.
    ///
    /// A missing request timeout falls back to the default; anything above the
    /// ceiling is clamped down to it.
    pub fn effective_timeout(&self, requested_secs: Option<u64>) -> Duration {
        let secs = requested_secs
            .unwrap_or(self.default_timeout_secs)
            .min(self.max_timeout_secs);
        Duration::from_secs(secs)
    }
}
