//! # Leadflow CLI
//!
//! Operator-facing commands over the lead distribution engine. Every command
//! prints its result as JSON on stdout; logs go to stderr.

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

use anyhow::Context as _;
use serde_json::Value;

pub use cli::{Cli, Command};
pub use context::AppContext;

/// Resolve configuration, wire the context and run `cli.command`.
pub async fn run(cli: Cli) -> anyhow::Result<Value> {
    let config = context::resolve_config(cli.config.as_deref(), cli.db.as_deref())
        .context("failed to load configuration")?;
    let ctx = AppContext::new(config, cli.targets).context("failed to open lead store")?;

    let output = commands::execute(&ctx, cli.command).await?;
    Ok(output)
}
