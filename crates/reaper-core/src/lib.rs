//! # reaper-core
//!
//! Deletion orchestration for VM-backed sandboxes.
//!
//! Given a container ID, reaper decides whether the target may be deleted,
//! whether it is a whole sandbox or one member container, and in which
//! order the runtime's stop and delete operations run. Post-stop hooks and
//! the ID mapping are cleaned up once the runtime has deleted the target.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       reaper-core                        │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ids ──▶ Deleter::delete_all  (sequential, fail-fast)    │
//! │                 │                                        │
//! │                 ▼                                        │
//! │  ┌─────────────────┐      ┌──────────────────────────┐   │
//! │  │ StatusResolver  │─────▶│ IdMapping + runtime      │   │
//! │  └─────────────────┘      └──────────────────────────┘   │
//! │                 │  (failure + force ⇒ done, Ok)          │
//! │                 ▼                                        │
//! │  ┌─────────────────┐                                     │
//! │  │ DeletePlan      │  classify, load spec, running?      │
//! │  └─────────────────┘                                     │
//! │         │                      │                         │
//! │   PodSandbox              PodContainer                   │
//! │         ▼                      ▼                         │
//! │  status → stop? → delete   stop? → delete                │
//! │         │                      │                         │
//! │         └──────────┬───────────┘                         │
//! │                    ▼                                     │
//! │  post-stop hooks ──▶ remove ID mapping                   │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use reaper_core::{Deleter, ReaperConfig};
//!
//! # async fn example() -> reaper_core::Result<()> {
//! let config = ReaperConfig::from_env();
//! let deleter = Deleter::from_config(&config);
//!
//! // Delete two containers, killing them if they are still running
//! deleter.delete_all(&["web", "worker"], true).await?;
//!
//! // Cgroup removal is a separate step
//! reaper_core::remove_cgroups_path("web", &["/sys/fs/cgroup/reaper/web"]).await?;
//! # Ok(())
//! # }
//! ```

mod cleanup;
mod config;
mod context;
mod delete;
mod error;
mod hooks;
mod resolve;
mod spec;

pub use cleanup::remove_cgroups_path;
pub use config::{ConfigError, ReaperConfig, ReaperConfigBuilder};
pub use context::DeleteContext;
pub use delete::{DeletePlan, Deleter};
pub use error::{DeleteError, Result};
pub use hooks::{HookError, HookRunner, ProcessHookRunner};
pub use resolve::{MappedResolver, Resolved, StatusResolver};
pub use spec::{Hook, Hooks, Spec, SpecError};
