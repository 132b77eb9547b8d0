//! `tabi snapshot` command: print the context the planner would receive.

use anyhow::{Context, Result};

use tabi_core::snapshot::{build_context, focused_window};

use crate::config::TabiConfig;
use crate::session_file;

pub async fn run_snapshot(config: &TabiConfig, bookmarks: bool) -> Result<()> {
    let session = session_file::open(&config.session_path)?;
    let window = focused_window(&session).await?;
    let context = build_context(&session, &window, bookmarks || config.include_bookmarks).await?;
    let json = serde_json::to_string_pretty(&context).context("failed to serialize snapshot")?;
    println!("{json}");
    Ok(())
}
