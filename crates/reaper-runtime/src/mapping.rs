//! Container ID to sandbox ID mapping.
//!
//! Every container created through the runtime gets an entry mapping its ID
//! to the sandbox that owns it. Deleting the container removes the entry.

use crate::error::{Result, RuntimeError};
use crate::id::{verify_container_id, verify_prefix, verify_sandbox_id};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Directory under the state root holding mapping entries.
const MAPPING_DIR: &str = "mapping";

/// A resolved mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Full container ID.
    pub container_id: String,
    /// ID of the sandbox that owns the container.
    pub sandbox_id: String,
}

/// Persistent association between container IDs and their sandbox.
#[async_trait]
pub trait IdMapping: Send + Sync {
    /// Look up the mapping for a container ID or unique ID prefix.
    async fn fetch(&self, id: &str) -> Result<Mapping>;

    /// Remove the mapping for a container ID. Removing a missing entry succeeds.
    async fn remove(&self, container_id: &str) -> Result<()>;
}

/// File-backed mapping: one file per container named by its ID, holding the
/// sandbox ID.
#[derive(Debug, Clone)]
pub struct FsIdMapping {
    dir: PathBuf,
}

impl FsIdMapping {
    /// Create a mapping store under `root/mapping`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(MAPPING_DIR),
        }
    }

    /// Directory holding the mapping files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record that `container_id` belongs to `sandbox_id`.
    pub async fn add(&self, container_id: &str, sandbox_id: &str) -> Result<()> {
        verify_container_id(container_id)?;
        verify_sandbox_id(sandbox_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(container_id), sandbox_id).await?;
        tracing::debug!(container_id, sandbox_id, "Added container mapping");
        Ok(())
    }

    /// Read the sandbox ID stored for `container_id`. The stored value is
    /// checked too, since it becomes a path under the runtime root.
    async fn read_entry(&self, container_id: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.dir.join(container_id)).await {
            Ok(content) => {
                let sandbox_id = content.trim();
                if sandbox_id.is_empty() {
                    return Ok(None);
                }
                verify_sandbox_id(sandbox_id)?;
                Ok(Some(sandbox_id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn matching_ids(&self, prefix: &str) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut matches = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) && verify_container_id(name).is_ok() {
                    matches.push(name.to_string());
                }
            }
        }
        Ok(matches)
    }
}

#[async_trait]
impl IdMapping for FsIdMapping {
    async fn fetch(&self, id: &str) -> Result<Mapping> {
        verify_prefix(id)?;

        if let Some(sandbox_id) = self.read_entry(id).await? {
            return Ok(Mapping {
                container_id: id.to_string(),
                sandbox_id,
            });
        }

        let mut matches = self.matching_ids(id).await?;
        match matches.len() {
            0 => Err(RuntimeError::container_not_found(id)),
            1 => {
                let container_id = matches.remove(0);
                let sandbox_id = self
                    .read_entry(&container_id)
                    .await?
                    .ok_or_else(|| RuntimeError::container_not_found(id))?;
                tracing::debug!(prefix = id, %container_id, "Resolved container ID prefix");
                Ok(Mapping {
                    container_id,
                    sandbox_id,
                })
            }
            count => Err(RuntimeError::Ambiguous {
                prefix: id.to_string(),
                count,
            }),
        }
    }

    async fn remove(&self, container_id: &str) -> Result<()> {
        verify_container_id(container_id)?;
        match tokio::fs::remove_file(self.dir.join(container_id)).await {
            Ok(()) => {
                tracing::debug!(container_id, "Removed container mapping");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
