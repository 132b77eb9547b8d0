//! `tabi apply` command: dispatch a plan read from a JSON file, without
//! asking the planner.

use std::path::Path;

use anyhow::{Context, Result};

use tabi_core::Dispatcher;
use tabi_core::plan::RawPlan;

use crate::config::TabiConfig;
use crate::console::{self, ConsoleStatus};
use crate::session_file;

/// Apply the plan in `file`. Returns whether it ended in success.
pub async fn run_apply(config: &TabiConfig, file: &Path) -> Result<bool> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read plan file {}", file.display()))?;
    let raw: RawPlan = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a plan (expected {{\"action\", \"output\"}})", file.display()))?;

    let session = session_file::open(&config.session_path)?;
    let outcome = Dispatcher::new(&session, &ConsoleStatus)
        .with_resolver(config.resolver)
        .dispatch(&raw)
        .await;

    console::print_report(&outcome.report);
    session_file::save(&session, &config.session_path)?;
    Ok(outcome.succeeded())
}
