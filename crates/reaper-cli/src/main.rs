//! reaper entry point.
//!
//! Deletes sandboxes and containers recorded under the state root. Logs go
//! to stderr; the exit status is non-zero when any ID fails.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use reaper_core::{Deleter, ReaperConfig};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ReaperConfig::from_env();
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(filter) = cli.log {
        config.log_filter = filter;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(?config, "Configuration loaded");
    config.validate_warn();

    let deleter = Deleter::from_config(&config);

    match cli.command {
        Command::Delete {
            container_ids,
            force,
        } => {
            // Dropping the pipeline future abandons the current ID mid-way;
            // nothing is rolled back.
            tokio::select! {
                result = deleter.delete_all(&container_ids, force) => result?,
                _ = signal::ctrl_c() => {
                    tracing::warn!("Interrupted, remaining IDs not deleted");
                    anyhow::bail!("interrupted");
                }
            }
        }
    }

    Ok(())
}
