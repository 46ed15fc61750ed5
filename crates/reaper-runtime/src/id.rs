//! Identifier checks for IDs that end up as path components.
//!
//! Valid IDs match [`ID_PATTERN`], which keeps `/`, `..` and hidden names
//! out of the state directories.

use crate::error::{Result, RuntimeError};
use regex::Regex;
use std::sync::OnceLock;

/// Full container and sandbox IDs.
pub const ID_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_.-]+$";

/// Lookup prefixes may stop after the first character.
const PREFIX_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$";

static ID_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PREFIX_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Check a full container ID.
pub fn verify_container_id(id: &str) -> Result<()> {
    verify("container", id, &ID_RE, ID_PATTERN)
}

/// Check a sandbox ID.
pub fn verify_sandbox_id(id: &str) -> Result<()> {
    verify("sandbox", id, &ID_RE, ID_PATTERN)
}

/// Check a container ID prefix.
pub(crate) fn verify_prefix(prefix: &str) -> Result<()> {
    verify("container", prefix, &PREFIX_RE, PREFIX_PATTERN)
}

fn verify(
    kind: &'static str,
    id: &str,
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Result<()> {
    if id.is_empty() {
        return Err(RuntimeError::MissingId);
    }

    let valid = cell
        .get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(id));

    if valid {
        Ok(())
    } else {
        Err(RuntimeError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_runtime_ids() {
        for id in ["c1", "sb", "4f9a0c1e", "pod_sandbox-1.2", "A0"] {
            verify_container_id(id).unwrap();
        }
        verify_prefix("a").unwrap();
    }

    #[test]
    fn test_rejects_path_escapes() {
        for id in ["../x", "a/b", "..", ".hidden", "/abs", "-flag", "a\0b", "x"] {
            let err = verify_sandbox_id(id).unwrap_err();
            assert!(
                matches!(err, RuntimeError::InvalidId { kind: "sandbox", .. }),
                "{id:?} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn test_empty_is_missing() {
        assert!(matches!(
            verify_container_id("").unwrap_err(),
            RuntimeError::MissingId
        ));
    }
}
