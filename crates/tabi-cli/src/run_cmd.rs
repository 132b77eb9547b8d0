//! `tabi run` command: send a prompt to the planner and apply the plan.

use anyhow::{Context, Result, bail};

use tabi_core::planner::HttpPlanner;
use tabi_core::{CommandOptions, EngineError, run_command};

use crate::config::TabiConfig;
use crate::console::{self, ConsoleStatus};
use crate::session_file;

/// Run one prompt. Returns whether the invocation ended in success.
///
/// The session file is only rewritten once a plan has been dispatched;
/// fatal errors before that leave it untouched.
pub async fn run_prompt(config: &TabiConfig, prompt: &str) -> Result<bool> {
    let session = session_file::open(&config.session_path)?;
    let planner = HttpPlanner::new(&config.planner).context("failed to create planner client")?;
    let options = CommandOptions {
        include_bookmarks: config.include_bookmarks,
        resolver: config.resolver,
    };

    tracing::debug!(endpoint = %planner.endpoint(), "using planner");

    match run_command(&session, &planner, &ConsoleStatus, prompt, &options).await {
        Ok(outcome) => {
            console::print_report(&outcome.report);
            session_file::save(&session, &config.session_path)?;
            Ok(outcome.succeeded())
        }
        Err(EngineError::EmptyPrompt) => bail!("prompt is empty"),
        Err(e) => {
            eprintln!("  {e}");
            Ok(false)
        }
    }
}
