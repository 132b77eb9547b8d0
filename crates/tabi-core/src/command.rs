//! Command runner: one user prompt from snapshot to terminal status.

use tabi_session::BrowserSession;

use crate::dispatch::status::{self, Status, StatusSink};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::EngineError;
use crate::planner::{PlanRequest, Planner, PlannerError};
use crate::resolve::TitleResolver;
use crate::snapshot::{build_context, focused_window};

/// Knobs for [`run_command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandOptions {
    /// Attach the bookmark tree to the planner context.
    pub include_bookmarks: bool,
    pub resolver: TitleResolver,
}

/// Run a prompt end to end.
///
/// Steps:
/// 1. Publish the "executing" progress status
/// 2. Resolve the focused window
/// 3. Snapshot it (and optionally bookmarks) into a planner context
/// 4. Ask the planner for a plan
/// 5. Dispatch the plan
///
/// Failures in steps 2-4 publish an error status and return `Err`; nothing
/// has been mutated at that point. Once a plan is in hand, every outcome is
/// reported through the returned [`DispatchOutcome`].
pub async fn run_command(
    session: &dyn BrowserSession,
    planner: &dyn Planner,
    sink: &dyn StatusSink,
    prompt: &str,
    options: &CommandOptions,
) -> Result<DispatchOutcome, EngineError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(EngineError::EmptyPrompt);
    }

    tracing::info!(prompt = %prompt, "running command");
    sink.publish(&Status::progress(status::EXECUTING));

    let window = match focused_window(session).await {
        Ok(window) => window,
        Err(e) => return Err(fail(sink, e)),
    };

    let context = match build_context(session, &window, options.include_bookmarks).await {
        Ok(context) => context,
        Err(e) => return Err(fail(sink, e)),
    };

    let request = PlanRequest {
        prompt: prompt.to_string(),
        context,
    };
    let raw = match planner.plan(&request).await {
        Ok(raw) => raw,
        Err(e) => return Err(fail(sink, e.into())),
    };

    let outcome = Dispatcher::new(session, sink)
        .with_resolver(options.resolver)
        .dispatch(&raw)
        .await;
    Ok(outcome)
}

/// Publish the user-facing message for a fatal error and hand it back.
fn fail(sink: &dyn StatusSink, error: EngineError) -> EngineError {
    let message = match &error {
        EngineError::NoWindow => status::NO_WINDOW,
        EngineError::Planner(PlannerError::Status { .. }) => status::BACKEND_ERROR,
        _ => status::COMMAND_FAILED,
    };
    tracing::error!(error = %error, "command failed");
    sink.publish(&Status::error(message));
    error
}
