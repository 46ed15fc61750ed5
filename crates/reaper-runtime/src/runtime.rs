//! The narrow runtime interface reaper drives.

use crate::error::Result;
use crate::status::{ContainerStatus, SandboxStatus};
use async_trait::async_trait;

/// Status, stop and delete operations of a VM-backed sandbox runtime.
///
/// Implementations own the actual VM and container lifecycle. Callers
/// decide when and in what order these are invoked.
#[async_trait]
pub trait SandboxRuntime: Send + Sync {
    /// Current status of the whole sandbox.
    async fn status_sandbox(&self, sandbox_id: &str) -> Result<SandboxStatus>;

    /// Current status of one container inside a sandbox.
    async fn status_container(&self, sandbox_id: &str, container_id: &str)
        -> Result<ContainerStatus>;

    /// Stop the sandbox. With `force` the VM is killed rather than shut down.
    async fn stop_sandbox(&self, sandbox_id: &str, force: bool) -> Result<()>;

    /// Delete a stopped sandbox and everything it owns.
    async fn delete_sandbox(&self, sandbox_id: &str) -> Result<()>;

    /// Forcibly stop a single container.
    async fn stop_container(&self, sandbox_id: &str, container_id: &str) -> Result<()>;

    /// Delete a single, non-running container.
    async fn delete_container(&self, sandbox_id: &str, container_id: &str) -> Result<()>;
}
