//! Error types for reaper-runtime.

use thiserror::Error;

/// Result type alias for reaper-runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors returned by the sandbox runtime and the identifier mapping store.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No identifier was supplied
    #[error("missing container ID")]
    MissingId,

    /// Container or sandbox does not exist
    #[error("{kind} ID ({id}) does not exist")]
    NotFound {
        /// "container" or "sandbox"
        kind: &'static str,
        /// The identifier that was looked up
        id: String,
    },

    /// Identifier contains characters that are unsafe in a state path
    #[error("invalid {kind} ID ({id}): must match {}", crate::id::ID_PATTERN)]
    InvalidId {
        /// "container" or "sandbox"
        kind: &'static str,
        /// The rejected identifier
        id: String,
    },

    /// An identifier prefix matched more than one container
    #[error("container ID prefix ({prefix}) is ambiguous: matches {count} containers")]
    Ambiguous {
        /// The prefix supplied by the caller
        prefix: String,
        /// Number of matching containers
        count: usize,
    },

    /// Invalid state for the requested operation
    #[error("invalid state for {id}: expected {expected}, got {actual}")]
    InvalidState {
        /// The container or sandbox ID
        id: String,
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Failed to deliver a signal to a VMM or container process
    #[error("failed to signal pid {pid}: {message}")]
    Signal {
        /// Target process ID
        pid: u32,
        /// Error message from the OS
        message: String,
    },

    /// Corrupt persisted record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Build a `NotFound` error for a container ID.
    pub fn container_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "container",
            id: id.into(),
        }
    }

    /// Build a `NotFound` error for a sandbox ID.
    pub fn sandbox_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "sandbox",
            id: id.into(),
        }
    }

    /// Whether this error means the entity is already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
