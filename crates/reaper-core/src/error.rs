//! Error types for reaper-core.

use crate::hooks::HookError;
use crate::spec::SpecError;
use reaper_runtime::{ClassifyError, RuntimeError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for reaper-core operations.
pub type Result<T> = std::result::Result<T, DeleteError>;

/// Errors that abort a delete invocation.
///
/// Collaborator errors are carried unchanged; the variant records which
/// stage produced them.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// No container IDs were supplied
    #[error("missing container ID, should at least provide one")]
    Argument,

    /// The ID could not be resolved to a container
    #[error(transparent)]
    Resolution(RuntimeError),

    /// The container is running and force was not requested
    #[error("container {container_id} still running, should be stopped")]
    Precondition {
        /// Resolved container ID
        container_id: String,
    },

    /// The container type annotation is missing or unknown
    #[error(transparent)]
    Classification(#[from] ClassifyError),

    /// The OCI spec could not be recovered from the status record
    #[error(transparent)]
    SpecConfig(#[from] SpecError),

    /// Stopping the sandbox or container failed
    #[error(transparent)]
    Stop(RuntimeError),

    /// Deleting the sandbox or container failed
    #[error(transparent)]
    Delete(RuntimeError),

    /// A post-stop hook failed
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Removing the container ID mapping failed
    #[error(transparent)]
    MappingRemoval(RuntimeError),

    /// Removing a cgroup directory failed
    #[error("{error}")]
    Cleanup {
        /// The directory that could not be removed
        path: PathBuf,
        /// The removal error, reported as is
        error: std::io::Error,
    },
}
