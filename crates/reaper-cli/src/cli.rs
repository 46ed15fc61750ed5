//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reaper", about = "Stop and delete VM-backed sandboxes and containers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// State directory shared with the runtime (overrides REAPER_ROOT).
    #[arg(long, global = true, env = "REAPER_ROOT")]
    pub root: Option<PathBuf>,

    /// Log filter directive, e.g. `reaper=debug`.
    #[arg(long, global = true, env = "REAPER_LOG")]
    pub log: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete one or more containers or sandboxes.
    Delete {
        /// Container IDs; a unique prefix is enough.
        #[arg(required = true, value_name = "CONTAINER_ID")]
        container_ids: Vec<String>,

        /// Kill running targets instead of refusing, and ignore unknown IDs.
        #[arg(short, long)]
        force: bool,
    },
}
