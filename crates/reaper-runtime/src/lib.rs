//! # reaper-runtime
//!
//! Runtime-facing layer for reaper.
//! Defines the narrow status/stop/delete interface reaper drives and ships a
//! file-backed implementation of it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reaper_runtime::{FsRuntime, SandboxRuntime};
//!
//! # async fn example() -> reaper_runtime::Result<()> {
//! let runtime = FsRuntime::new("/run/reaper");
//!
//! let status = runtime.status_sandbox("sandbox-1").await?;
//! if !status.state.is_stopped() {
//!     runtime.stop_sandbox("sandbox-1", false).await?;
//! }
//! runtime.delete_sandbox("sandbox-1").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Runtime Interface**: `SandboxRuntime` trait for status, stop and delete
//! - **Classification**: `ContainerType` parsed from OCI annotations
//! - **ID Mapping**: container ID to sandbox ID lookup, with unique-prefix matching
//! - **File-backed Store**: JSON records per sandbox and container

mod error;
mod id;
mod mapping;
mod runtime;
mod state;
mod status;
mod store;

pub use error::{Result, RuntimeError};
pub use id::{verify_container_id, verify_sandbox_id};
pub use mapping::{FsIdMapping, IdMapping, Mapping};
pub use runtime::SandboxRuntime;
pub use state::RunState;
pub use status::{
    ClassifyError, ContainerStatus, ContainerType, SandboxStatus, BUNDLE_PATH_KEY,
    CONFIG_JSON_KEY, CONTAINER_TYPE_KEY,
};
pub use store::FsRuntime;
