//! Request-scoped context for one delete pipeline.

use tracing::Span;

/// Identifiers and intent for a single ID's delete pipeline.
///
/// A context is never mutated: resolving the caller's ID yields a new
/// context carrying the resolved container and sandbox IDs. Every stage
/// derives its tracing span from the context it was handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteContext {
    container_id: String,
    sandbox_id: Option<String>,
    force: bool,
}

impl DeleteContext {
    /// Context for a caller-supplied ID before resolution.
    pub fn new(container_id: impl Into<String>, force: bool) -> Self {
        Self {
            container_id: container_id.into(),
            sandbox_id: None,
            force,
        }
    }

    /// A new context for the resolved container and its sandbox.
    pub fn resolved(&self, container_id: impl Into<String>, sandbox_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            sandbox_id: Some(sandbox_id.into()),
            force: self.force,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Owning sandbox ID, empty until resolved.
    pub fn sandbox_id(&self) -> &str {
        self.sandbox_id.as_deref().unwrap_or_default()
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Span for a pipeline stage, tagged with this context's IDs.
    pub fn span(&self, stage: &'static str) -> Span {
        tracing::info_span!(
            "delete",
            stage,
            subsystem = "delete",
            container = %self.container_id,
            sandbox = %self.sandbox_id(),
            force = self.force,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_keeps_force_and_leaves_original_untouched() {
        let ctx = DeleteContext::new("c1", true);
        let resolved = ctx.resolved("c1-full", "sb");

        assert_eq!(ctx.container_id(), "c1");
        assert_eq!(ctx.sandbox_id(), "");
        assert_eq!(resolved.container_id(), "c1-full");
        assert_eq!(resolved.sandbox_id(), "sb");
        assert!(resolved.force());
    }
}
