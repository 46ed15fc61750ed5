//! Post-stop hook execution.
//!
//! Each hook is spawned with the OCI state of the sandbox on stdin and must
//! exit zero within its timeout. Hooks run one at a time in declaration
//! order; the first failure stops the rest.

use crate::spec::{Hook, Spec};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Maximum stderr kept in a hook failure message.
const MAX_STDERR_SIZE: usize = 4096;

/// Errors from running lifecycle hooks.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to spawn hook {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hook {} timed out after {timeout:?}", path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("hook {} exited with {status}: {stderr}", path.display())]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("failed to encode hook state: {0}")]
    State(#[from] serde_json::Error),

    #[error("I/O error talking to hook {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runs the lifecycle hooks declared in an OCI spec.
#[async_trait]
pub trait HookRunner: Send + Sync {
    /// Run every post-stop hook for `sandbox_id`, created from `bundle_path`.
    async fn post_stop(&self, spec: &Spec, sandbox_id: &str, bundle_path: &str)
        -> Result<(), HookError>;
}

/// OCI state document written to a hook's stdin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HookState<'a> {
    oci_version: &'a str,
    id: &'a str,
    status: &'static str,
    pid: u32,
    bundle: &'a str,
}

/// Runs hooks as child processes.
#[derive(Debug, Clone)]
pub struct ProcessHookRunner {
    default_timeout: Duration,
}

impl ProcessHookRunner {
    /// Create a runner. `default_timeout` applies to hooks without their own.
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    async fn run_hook(&self, hook: &Hook, state: &[u8]) -> Result<(), HookError> {
        let timeout = hook
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);
        tracing::debug!(path = %hook.path.display(), ?timeout, "Running hook");

        let mut cmd = Command::new(&hook.path);
        if let Some((_argv0, rest)) = hook.args.split_first() {
            #[cfg(unix)]
            cmd.arg0(_argv0);
            cmd.args(rest);
        }
        cmd.env_clear();
        for kv in &hook.env {
            if let Some((key, value)) = kv.split_once('=') {
                cmd.env(key, value);
            }
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| HookError::Spawn {
            path: hook.path.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A hook may exit without reading its state.
            if let Err(e) = stdin.write_all(state).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(HookError::Io {
                        path: hook.path.clone(),
                        source: e,
                    });
                }
            }
        }

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| HookError::Io {
                path: hook.path.clone(),
                source,
            })?,
            Err(_) => {
                tracing::warn!(path = %hook.path.display(), ?timeout, "Hook timed out");
                return Err(HookError::Timeout {
                    path: hook.path.clone(),
                    timeout,
                });
            }
        };

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.len() > MAX_STDERR_SIZE {
                let mut end = MAX_STDERR_SIZE;
                while !stderr.is_char_boundary(end) {
                    end -= 1;
                }
                stderr.truncate(end);
            }
            return Err(HookError::Failed {
                path: hook.path.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl HookRunner for ProcessHookRunner {
    async fn post_stop(
        &self,
        spec: &Spec,
        sandbox_id: &str,
        bundle_path: &str,
    ) -> Result<(), HookError> {
        let hooks = spec.post_stop_hooks();
        if hooks.is_empty() {
            tracing::debug!(sandbox_id, "No post-stop hooks");
            return Ok(());
        }

        let state = serde_json::to_vec(&HookState {
            oci_version: &spec.oci_version,
            id: sandbox_id,
            status: "stopped",
            pid: std::process::id(),
            bundle: bundle_path,
        })?;

        for hook in hooks {
            self.run_hook(hook, &state).await?;
        }

        tracing::info!(sandbox_id, count = hooks.len(), "Post-stop hooks completed");
        Ok(())
    }
}
