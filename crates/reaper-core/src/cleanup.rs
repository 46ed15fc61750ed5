//! Work done once the sandbox or container itself is gone.

use crate::context::DeleteContext;
use crate::delete::{DeletePlan, Deleter};
use crate::error::{DeleteError, Result};
use std::io;
use std::path::Path;
use tracing::Instrument;

impl Deleter {
    /// Run post-stop hooks, then drop the container's ID mapping.
    pub(crate) async fn post_delete(&self, ctx: &DeleteContext, plan: &DeletePlan) -> Result<()> {
        async {
            self.hooks
                .post_stop(&plan.spec, ctx.sandbox_id(), &plan.bundle_path)
                .await?;

            self.mapping
                .remove(ctx.container_id())
                .await
                .map_err(DeleteError::MappingRemoval)?;
            tracing::debug!(container = ctx.container_id(), "Removed container mapping");
            Ok::<(), DeleteError>(())
        }
        .instrument(ctx.span("post_delete"))
        .await
    }
}

/// Remove the cgroup directories of a deleted container.
///
/// Paths are removed in order and the first failure is returned; later
/// paths are left in place. A path that no longer exists counts as removed.
pub async fn remove_cgroups_path<P: AsRef<Path>>(container_id: &str, paths: &[P]) -> Result<()> {
    let span = tracing::info_span!("remove_cgroups_path", subsystem = "delete", container = %container_id);
    async {
        if paths.is_empty() {
            tracing::info!(
                container = container_id,
                "Cgroups files not removed because cgroupsPath was empty"
            );
            return Ok(());
        }

        for path in paths {
            let path = path.as_ref();
            match remove_path(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed cgroup path"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Cgroup path already gone");
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "Failed to remove cgroup path");
                    return Err(DeleteError::Cleanup {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }
        Ok(())
    }
    .instrument(span)
    .await
}

/// Remove `path` with a plain `rmdir` first.
///
/// cgroupfs refuses to unlink its control files but drops the whole group
/// on `rmdir`, so the recursive walk is only a fallback for ordinary
/// non-empty directories.
async fn remove_path(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotADirectory => tokio::fs::remove_file(path).await,
        Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
            tokio::fs::remove_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}
