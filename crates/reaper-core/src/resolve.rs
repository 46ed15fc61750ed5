//! Resolution of a caller-supplied ID to a container status record.

use async_trait::async_trait;
use reaper_runtime::{ContainerStatus, IdMapping, RuntimeError, SandboxRuntime};
use std::sync::Arc;

/// A container status together with the sandbox that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Status of the resolved container. `status.id` is the full container ID.
    pub status: ContainerStatus,
    /// ID of the owning sandbox.
    pub sandbox_id: String,
}

/// Maps a container ID to its current status and owning sandbox.
#[async_trait]
pub trait StatusResolver: Send + Sync {
    async fn resolve(&self, id: &str) -> Result<Resolved, RuntimeError>;
}

/// Resolves through the ID mapping, then asks the runtime for the status.
pub struct MappedResolver {
    mapping: Arc<dyn IdMapping>,
    runtime: Arc<dyn SandboxRuntime>,
}

impl MappedResolver {
    pub fn new(mapping: Arc<dyn IdMapping>, runtime: Arc<dyn SandboxRuntime>) -> Self {
        Self { mapping, runtime }
    }
}

#[async_trait]
impl StatusResolver for MappedResolver {
    async fn resolve(&self, id: &str) -> Result<Resolved, RuntimeError> {
        if id.is_empty() {
            return Err(RuntimeError::MissingId);
        }

        let mapping = self.mapping.fetch(id).await?;
        let status = self
            .runtime
            .status_container(&mapping.sandbox_id, &mapping.container_id)
            .await?;

        if status.id.is_empty() {
            return Err(RuntimeError::container_not_found(id));
        }

        Ok(Resolved {
            status,
            sandbox_id: mapping.sandbox_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_runtime::{FsIdMapping, FsRuntime, RunState, SandboxStatus};
    use std::collections::HashMap;

    async fn fixture(root: &std::path::Path) -> MappedResolver {
        let runtime = FsRuntime::new(root);
        let mapping = FsIdMapping::new(root);
        runtime
            .save_sandbox(&SandboxStatus {
                id: "sb".into(),
                state: RunState::Running,
                pid: None,
                containers: vec!["c1-full".into()],
            })
            .await
            .unwrap();
        runtime
            .save_container(
                "sb",
                &ContainerStatus {
                    id: "c1-full".into(),
                    state: RunState::Stopped,
                    pid: None,
                    annotations: HashMap::new(),
                },
            )
            .await
            .unwrap();
        mapping.add("c1-full", "sb").await.unwrap();
        MappedResolver::new(Arc::new(mapping), Arc::new(runtime))
    }

    #[tokio::test]
    async fn test_resolve_prefix_to_full_id() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = fixture(tmp.path()).await;

        let resolved = resolver.resolve("c1").await.unwrap();
        assert_eq!(resolved.status.id, "c1-full");
        assert_eq!(resolved.sandbox_id, "sb");
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = fixture(tmp.path()).await;

        let err = resolver.resolve("zz").await.unwrap_err();
        assert_eq!(err.to_string(), "container ID (zz) does not exist");
    }

    #[tokio::test]
    async fn test_resolve_empty_id() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = fixture(tmp.path()).await;

        assert!(matches!(
            resolver.resolve("").await.unwrap_err(),
            RuntimeError::MissingId
        ));
    }
}
