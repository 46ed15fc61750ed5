//! File-backed sandbox runtime.
//!
//! Sandbox and container records live as JSON under
//! `<root>/sbs/<sandbox_id>/`:
//!
//! ```text
//! sbs/
//! └── <sandbox_id>/
//!     ├── sandbox.json          SandboxStatus
//!     └── <container_id>.json   ContainerStatus
//! ```
//!
//! Stopping signals the recorded VMM or container process and marks the
//! record stopped. Deleting removes the records.

use crate::error::{Result, RuntimeError};
use crate::id::{verify_container_id, verify_sandbox_id};
use crate::runtime::SandboxRuntime;
use crate::state::RunState;
use crate::status::{ContainerStatus, SandboxStatus};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory under the state root holding per-sandbox directories.
const SANDBOXES_DIR: &str = "sbs";

/// Name of the sandbox record inside its directory.
const SANDBOX_FILE: &str = "sandbox.json";

/// Runtime backed by JSON records on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsRuntime {
    sbs_dir: PathBuf,
}

impl FsRuntime {
    /// Create a runtime rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            sbs_dir: root.as_ref().join(SANDBOXES_DIR),
        }
    }

    /// Directory holding a sandbox's records. Fails for IDs that are not
    /// a single safe path component.
    pub fn sandbox_dir(&self, sandbox_id: &str) -> Result<PathBuf> {
        verify_sandbox_id(sandbox_id)?;
        Ok(self.sbs_dir.join(sandbox_id))
    }

    fn sandbox_file(&self, sandbox_id: &str) -> Result<PathBuf> {
        Ok(self.sandbox_dir(sandbox_id)?.join(SANDBOX_FILE))
    }

    fn container_file(&self, sandbox_id: &str, container_id: &str) -> Result<PathBuf> {
        verify_container_id(container_id)?;
        Ok(self
            .sandbox_dir(sandbox_id)?
            .join(format!("{container_id}.json")))
    }

    /// Persist a sandbox record, creating its directory if needed.
    pub async fn save_sandbox(&self, status: &SandboxStatus) -> Result<()> {
        tokio::fs::create_dir_all(self.sandbox_dir(&status.id)?).await?;
        write_json(&self.sandbox_file(&status.id)?, status).await
    }

    /// Persist a container record inside an existing sandbox directory.
    pub async fn save_container(&self, sandbox_id: &str, status: &ContainerStatus) -> Result<()> {
        let file = self.container_file(sandbox_id, &status.id)?;
        if !tokio::fs::try_exists(self.sandbox_dir(sandbox_id)?).await? {
            return Err(RuntimeError::sandbox_not_found(sandbox_id));
        }
        write_json(&file, status).await
    }

    async fn load_sandbox(&self, sandbox_id: &str) -> Result<SandboxStatus> {
        read_json(&self.sandbox_file(sandbox_id)?)
            .await?
            .ok_or_else(|| RuntimeError::sandbox_not_found(sandbox_id))
    }

    async fn load_container(&self, sandbox_id: &str, container_id: &str) -> Result<ContainerStatus> {
        read_json(&self.container_file(sandbox_id, container_id)?)
            .await?
            .ok_or_else(|| RuntimeError::container_not_found(container_id))
    }
}

#[async_trait]
impl SandboxRuntime for FsRuntime {
    async fn status_sandbox(&self, sandbox_id: &str) -> Result<SandboxStatus> {
        self.load_sandbox(sandbox_id).await
    }

    async fn status_container(
        &self,
        sandbox_id: &str,
        container_id: &str,
    ) -> Result<ContainerStatus> {
        self.load_container(sandbox_id, container_id).await
    }

    async fn stop_sandbox(&self, sandbox_id: &str, force: bool) -> Result<()> {
        let mut sandbox = self.load_sandbox(sandbox_id).await?;
        tracing::info!(sandbox_id, force, state = %sandbox.state, "Stopping sandbox");

        if let Some(pid) = sandbox.pid {
            signal_process(pid, force)?;
        }

        for container_id in &sandbox.containers {
            let mut container = match self.load_container(sandbox_id, container_id).await {
                Ok(c) => c,
                Err(e) if e.is_not_found() => {
                    tracing::debug!(sandbox_id, container_id, "Member record already gone");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !container.state.is_stopped() {
                container.state = RunState::Stopped;
                self.save_container(sandbox_id, &container).await?;
            }
        }

        sandbox.state = RunState::Stopped;
        self.save_sandbox(&sandbox).await?;
        tracing::info!(sandbox_id, "Sandbox stopped");
        Ok(())
    }

    async fn delete_sandbox(&self, sandbox_id: &str) -> Result<()> {
        let sandbox = self.load_sandbox(sandbox_id).await?;
        if !sandbox.state.is_stopped() {
            return Err(RuntimeError::InvalidState {
                id: sandbox_id.to_string(),
                expected: RunState::Stopped.to_string(),
                actual: sandbox.state.to_string(),
            });
        }

        let dir = self.sandbox_dir(sandbox_id)?;
        tracing::info!(sandbox_id, path = %dir.display(), "Deleting sandbox");
        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    async fn stop_container(&self, sandbox_id: &str, container_id: &str) -> Result<()> {
        let mut container = self.load_container(sandbox_id, container_id).await?;
        tracing::warn!(sandbox_id, container_id, "Force stopping container");

        if let Some(pid) = container.pid {
            signal_process(pid, true)?;
        }

        container.state = RunState::Stopped;
        self.save_container(sandbox_id, &container).await
    }

    async fn delete_container(&self, sandbox_id: &str, container_id: &str) -> Result<()> {
        let container = self.load_container(sandbox_id, container_id).await?;
        if container.state.is_running() {
            return Err(RuntimeError::InvalidState {
                id: container_id.to_string(),
                expected: "not running".into(),
                actual: container.state.to_string(),
            });
        }

        tracing::info!(sandbox_id, container_id, "Deleting container");
        tokio::fs::remove_file(self.container_file(sandbox_id, container_id)?).await?;

        match self.load_sandbox(sandbox_id).await {
            Ok(mut sandbox) => {
                sandbox.containers.retain(|id| id != container_id);
                self.save_sandbox(&sandbox).await
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Send SIGTERM, or SIGKILL when `force` is set. A process that has already
/// exited counts as stopped.
///
/// Only positive pids are signalled: 0 and values that wrap to a negative
/// `pid_t` would address a process group or every process.
#[cfg(unix)]
fn signal_process(pid: u32, force: bool) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = match i32::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => {
            return Err(RuntimeError::Signal {
                pid,
                message: "refusing to signal a non-positive process ID".into(),
            })
        }
    };

    let signal = if force {
        Signal::SIGKILL
    } else {
        Signal::SIGTERM
    };

    match kill(Pid::from_raw(raw), signal) {
        Ok(()) => {
            tracing::debug!(pid, %signal, "Signalled process");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            tracing::debug!(pid, "Process already exited");
            Ok(())
        }
        Err(e) => Err(RuntimeError::Signal {
            pid,
            message: e.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn signal_process(pid: u32, _force: bool) -> Result<()> {
    Err(RuntimeError::Signal {
        pid,
        message: "process signalling is only supported on unix".into(),
    })
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}
