//! The subset of the OCI runtime spec needed to run post-stop hooks.

use reaper_runtime::{ContainerStatus, CONFIG_JSON_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// OCI runtime spec, reduced to what deletion needs.
///
/// Unknown fields are ignored so a full `config.json` deserializes cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    /// OCI spec version the container was created with.
    #[serde(default)]
    pub oci_version: String,

    /// Lifecycle hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
}

/// Lifecycle hooks. Only post-stop hooks run at deletion time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hooks {
    #[serde(default)]
    pub poststop: Vec<Hook>,
}

/// A single hook command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// Absolute path of the executable.
    pub path: PathBuf,
    /// Arguments including `argv[0]`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment in `KEY=VALUE` form.
    #[serde(default)]
    pub env: Vec<String>,
    /// Timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// The spec could not be recovered from a status record.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("annotation[{0}] not found")]
    MissingAnnotation(&'static str),

    #[error("invalid OCI spec: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Spec {
    /// Load the spec serialized into the container's annotations.
    pub fn from_status(status: &ContainerStatus) -> Result<Self, SpecError> {
        let raw = status
            .annotations
            .get(CONFIG_JSON_KEY)
            .ok_or(SpecError::MissingAnnotation(CONFIG_JSON_KEY))?;
        Ok(serde_json::from_str(raw)?)
    }

    /// Post-stop hooks in declaration order.
    pub fn post_stop_hooks(&self) -> &[Hook] {
        self.hooks
            .as_ref()
            .map(|h| h.poststop.as_slice())
            .unwrap_or_default()
    }
}
