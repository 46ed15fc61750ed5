//! Run state of sandboxes and containers.

use serde::{Deserialize, Serialize};

/// Current state of a sandbox or container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Created but not started
    Ready,
    /// Running
    Running,
    /// Paused
    Paused,
    /// Stopped
    Stopped,
}

impl RunState {
    /// The OCI runtime state name for this state.
    ///
    /// `Ready` is reported as `created`, everything else maps one to one.
    pub fn oci_status(&self) -> &'static str {
        match self {
            RunState::Ready => "created",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        }
    }

    /// Whether the entity is running.
    pub fn is_running(&self) -> bool {
        *self == RunState::Running
    }

    /// Whether the entity is stopped.
    pub fn is_stopped(&self) -> bool {
        *self == RunState::Stopped
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Ready => write!(f, "ready"),
            RunState::Running => write!(f, "running"),
            RunState::Paused => write!(f, "paused"),
            RunState::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oci_status() {
        assert_eq!(RunState::Ready.oci_status(), "created");
        assert_eq!(RunState::Running.oci_status(), "running");
        assert_eq!(RunState::Paused.oci_status(), "paused");
        assert_eq!(RunState::Stopped.oci_status(), "stopped");
    }

    #[test]
    fn test_state_predicates() {
        assert!(RunState::Running.is_running());
        assert!(!RunState::Paused.is_running());
        assert!(RunState::Stopped.is_stopped());
        assert!(!RunState::Ready.is_stopped());
    }

    #[test]
    fn test_state_serde_lowercase() {
        let json = serde_json::to_string(&RunState::Stopped).unwrap();
        assert_eq!(json, "\"stopped\"");
        let state: RunState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(state, RunState::Running);
    }
}
