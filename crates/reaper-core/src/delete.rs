//! The delete pipeline: resolve, validate, dispatch, sequence.

use crate::config::ReaperConfig;
use crate::context::DeleteContext;
use crate::error::{DeleteError, Result};
use crate::hooks::{HookRunner, ProcessHookRunner};
use crate::resolve::{MappedResolver, StatusResolver};
use crate::spec::Spec;
use reaper_runtime::{
    ContainerStatus, ContainerType, FsIdMapping, FsRuntime, IdMapping, SandboxRuntime,
};
use std::sync::Arc;
use tracing::Instrument;

/// What the validated status record tells the sequencers to do.
#[derive(Debug, Clone)]
pub struct DeletePlan {
    /// Which sequencer runs.
    pub container_type: ContainerType,
    /// Spec whose post-stop hooks run after deletion.
    pub spec: Spec,
    /// Bundle path handed to the hooks.
    pub bundle_path: String,
    /// The container is running and must be stopped before deletion.
    pub force_stop: bool,
}

impl DeletePlan {
    /// Check whether `status` may be deleted with the given `force` intent.
    ///
    /// A running container is only deletable under force, in which case it is
    /// stopped first.
    pub fn validate(status: &ContainerStatus, force: bool) -> Result<Self> {
        let container_type = ContainerType::from_annotations(&status.annotations)?;
        let spec = Spec::from_status(status)?;

        let mut force_stop = false;
        if status.state.is_running() {
            if !force {
                return Err(DeleteError::Precondition {
                    container_id: status.id.clone(),
                });
            }
            force_stop = true;
        }

        Ok(Self {
            container_type,
            spec,
            bundle_path: status.bundle_path().to_string(),
            force_stop,
        })
    }
}

/// Tears down sandboxes and containers.
///
/// Every collaborator is injected so the decision logic can be driven
/// against any runtime.
#[derive(Clone)]
pub struct Deleter {
    pub(crate) runtime: Arc<dyn SandboxRuntime>,
    pub(crate) resolver: Arc<dyn StatusResolver>,
    pub(crate) hooks: Arc<dyn HookRunner>,
    pub(crate) mapping: Arc<dyn IdMapping>,
}

impl Deleter {
    pub fn new(
        runtime: Arc<dyn SandboxRuntime>,
        resolver: Arc<dyn StatusResolver>,
        hooks: Arc<dyn HookRunner>,
        mapping: Arc<dyn IdMapping>,
    ) -> Self {
        Self {
            runtime,
            resolver,
            hooks,
            mapping,
        }
    }

    /// Wire the file-backed runtime, mapping and process hook runner.
    pub fn from_config(config: &ReaperConfig) -> Self {
        let runtime: Arc<dyn SandboxRuntime> = Arc::new(FsRuntime::new(&config.root));
        let mapping: Arc<dyn IdMapping> = Arc::new(FsIdMapping::new(&config.root));
        let resolver = Arc::new(MappedResolver::new(
            Arc::clone(&mapping),
            Arc::clone(&runtime),
        ));
        let hooks = Arc::new(ProcessHookRunner::new(config.hook_timeout));

        Self::new(runtime, resolver, hooks, mapping)
    }

    /// Delete every ID in order, stopping at the first failure.
    ///
    /// IDs after the failing one are left untouched; work already done for
    /// earlier IDs is not rolled back.
    pub async fn delete_all<S: AsRef<str>>(&self, ids: &[S], force: bool) -> Result<()> {
        if ids.is_empty() {
            return Err(DeleteError::Argument);
        }

        for id in ids {
            self.delete(id.as_ref(), force).await?;
        }
        Ok(())
    }

    /// Delete a single container or sandbox.
    pub async fn delete(&self, id: &str, force: bool) -> Result<()> {
        let ctx = DeleteContext::new(id, force);
        let span = ctx.span("delete");
        self.run(ctx).instrument(span).await
    }

    async fn run(&self, ctx: DeleteContext) -> Result<()> {
        let resolved = match self.resolver.resolve(ctx.container_id()).await {
            Ok(resolved) => resolved,
            Err(e) if ctx.force() => {
                tracing::warn!(
                    container = ctx.container_id(),
                    error = %e,
                    "Failed to get container, force will not fail"
                );
                return Ok(());
            }
            Err(e) => return Err(DeleteError::Resolution(e)),
        };

        let ctx = ctx.resolved(&resolved.status.id, &resolved.sandbox_id);
        let plan = DeletePlan::validate(&resolved.status, ctx.force())?;
        tracing::debug!(
            container = ctx.container_id(),
            sandbox = ctx.sandbox_id(),
            container_type = %plan.container_type,
            state = %resolved.status.state,
            force_stop = plan.force_stop,
            "Validated delete"
        );

        match plan.container_type {
            ContainerType::PodSandbox => self.delete_sandbox(&ctx).await?,
            ContainerType::PodContainer => self.delete_container(&ctx, plan.force_stop).await?,
        }

        self.post_delete(&ctx, &plan).await
    }

    /// Stop the sandbox unless it is already stopped, then delete it.
    ///
    /// The sandbox state is re-read rather than taken from the container
    /// record: it aggregates every member.
    async fn delete_sandbox(&self, ctx: &DeleteContext) -> Result<()> {
        let sandbox_id = ctx.sandbox_id();
        async {
            let status = self
                .runtime
                .status_sandbox(sandbox_id)
                .await
                .map_err(DeleteError::Resolution)?;

            if !status.state.is_stopped() {
                tracing::info!(
                    sandbox = sandbox_id,
                    state = %status.state,
                    force = ctx.force(),
                    "Stopping sandbox"
                );
                self.runtime
                    .stop_sandbox(sandbox_id, ctx.force())
                    .await
                    .map_err(DeleteError::Stop)?;
            }

            self.runtime
                .delete_sandbox(sandbox_id)
                .await
                .map_err(DeleteError::Delete)?;
            tracing::info!(sandbox = sandbox_id, "Sandbox deleted");
            Ok::<(), DeleteError>(())
        }
        .instrument(ctx.span("delete_sandbox"))
        .await
    }

    /// Stop the container if it was running under force, then delete it.
    async fn delete_container(&self, ctx: &DeleteContext, force_stop: bool) -> Result<()> {
        let (sandbox_id, container_id) = (ctx.sandbox_id(), ctx.container_id());
        async {
            if force_stop {
                self.runtime
                    .stop_container(sandbox_id, container_id)
                    .await
                    .map_err(DeleteError::Stop)?;
            }

            self.runtime
                .delete_container(sandbox_id, container_id)
                .await
                .map_err(DeleteError::Delete)?;
            tracing::info!(sandbox = sandbox_id, container = container_id, "Container deleted");
            Ok::<(), DeleteError>(())
        }
        .instrument(ctx.span("delete_container"))
        .await
    }
}
