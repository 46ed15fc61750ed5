//! Status records reported by the runtime.

use crate::state::RunState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Annotation holding the container classification.
pub const CONTAINER_TYPE_KEY: &str = "io.reaper.pkg.oci.container_type";

/// Annotation holding the OCI bundle path the container was created from.
pub const BUNDLE_PATH_KEY: &str = "io.reaper.pkg.oci.bundle_path";

/// Annotation holding the serialized OCI runtime spec.
pub const CONFIG_JSON_KEY: &str = "io.reaper.pkg.oci.config";

/// Classification of a container within a sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    /// The sandbox's own top-level container.
    PodSandbox,
    /// A member container running inside a sandbox.
    PodContainer,
}

/// Classification could not be determined from the annotations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("could not find container type annotation {CONTAINER_TYPE_KEY}")]
    Missing,

    #[error("invalid container type found: {0}")]
    Unknown(String),
}

impl ContainerType {
    /// Parse the container type annotation value.
    pub fn parse(s: &str) -> Result<Self, ClassifyError> {
        match s {
            "pod_sandbox" => Ok(Self::PodSandbox),
            "pod_container" => Ok(Self::PodContainer),
            other => Err(ClassifyError::Unknown(other.to_string())),
        }
    }

    /// Classify a container from its annotations.
    pub fn from_annotations(annotations: &HashMap<String, String>) -> Result<Self, ClassifyError> {
        annotations
            .get(CONTAINER_TYPE_KEY)
            .ok_or(ClassifyError::Missing)
            .and_then(|v| Self::parse(v))
    }

    /// The annotation value for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PodSandbox => "pod_sandbox",
            Self::PodContainer => "pod_container",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a single container's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    /// Resolved container ID.
    pub id: String,
    /// Current run state.
    pub state: RunState,
    /// Process ID of the container's init process, if started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// OCI annotations recorded at creation.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl ContainerStatus {
    /// The bundle path annotation, or an empty string when absent.
    pub fn bundle_path(&self) -> &str {
        self.annotations
            .get(BUNDLE_PATH_KEY)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Snapshot of a sandbox's aggregate status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxStatus {
    /// Sandbox ID.
    pub id: String,
    /// Aggregate state of the sandbox.
    pub state: RunState,
    /// Process ID of the VMM backing the sandbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// IDs of the containers that belong to the sandbox.
    #[serde(default)]
    pub containers: Vec<String>,
}
