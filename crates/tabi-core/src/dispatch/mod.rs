//! Plan dispatcher: routes a plan to its reconciler and drives the
//! invocation's status through a small state machine.

pub mod status;

use std::fmt;

use tabi_session::BrowserSession;

use crate::error::EngineError;
use crate::plan::{Plan, PlanAction, PlanParseError, RawPlan, parse_plan};
use crate::reconcile::{BookmarkReconciler, ReconcileReport, TabReconciler};
use crate::resolve::TitleResolver;
use crate::snapshot::focused_window;

pub use status::{Status, StatusKind, StatusSink, TracingStatusSink};

/// Where a dispatch is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Executing(PlanAction),
    Succeeded,
    Failed,
}

impl DispatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Executing(action) => write!(f, "executing({action})"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The dispatch state machine.
///
/// ```text
/// received  -> executing(action)
/// received  -> failed              (unsupported or malformed plan)
/// executing -> succeeded
/// executing -> failed
/// ```
///
/// Every transition publishes one status.
pub struct DispatchStateMachine<'a> {
    state: DispatchState,
    sink: &'a dyn StatusSink,
}

impl<'a> DispatchStateMachine<'a> {
    pub fn new(sink: &'a dyn StatusSink) -> Self {
        Self {
            state: DispatchState::Received,
            sink,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Check whether `from -> to` is an edge of the graph.
    pub fn is_valid_transition(from: DispatchState, to: DispatchState) -> bool {
        matches!(
            (from, to),
            (DispatchState::Received, DispatchState::Executing(_))
                | (DispatchState::Received, DispatchState::Failed)
                | (DispatchState::Executing(_), DispatchState::Succeeded)
                | (DispatchState::Executing(_), DispatchState::Failed)
        )
    }

    /// Move to `to` and publish `status`. An invalid edge is logged and
    /// ignored.
    pub fn transition(&mut self, to: DispatchState, status: &Status) {
        if !Self::is_valid_transition(self.state, to) {
            tracing::error!(from = %self.state, to = %to, "invalid dispatch transition");
            return;
        }
        tracing::debug!(from = %self.state, to = %to, "dispatch transition");
        self.state = to;
        self.sink.publish(status);
    }
}

/// Result of dispatching one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// `None` when the plan never got past parsing.
    pub action: Option<PlanAction>,
    /// Always terminal.
    pub state: DispatchState,
    /// The terminal status that was published.
    pub status: Status,
    pub report: ReconcileReport,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == DispatchState::Succeeded
    }
}

/// Routes plans to reconcilers.
pub struct Dispatcher<'a> {
    session: &'a dyn BrowserSession,
    sink: &'a dyn StatusSink,
    resolver: TitleResolver,
}

impl<'a> Dispatcher<'a> {
    pub fn new(session: &'a dyn BrowserSession, sink: &'a dyn StatusSink) -> Self {
        Self {
            session,
            sink,
            resolver: TitleResolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: TitleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Parse and execute `raw`. Never fails: every problem ends in a
    /// published terminal error status.
    pub async fn dispatch(&self, raw: &RawPlan) -> DispatchOutcome {
        let mut machine = DispatchStateMachine::new(self.sink);

        let plan = match parse_plan(raw) {
            Ok(plan) => plan,
            Err(e) => {
                let message = match &e {
                    PlanParseError::UnsupportedAction(_) => status::UNKNOWN_ACTION,
                    _ => status::MALFORMED_PLAN,
                };
                tracing::warn!(action = %raw.action, error = %e, "rejected plan");
                return finish(
                    &mut machine,
                    None,
                    Status::error(message),
                    ReconcileReport::new(),
                );
            }
        };

        let action = plan.action();
        machine.transition(
            DispatchState::Executing(action),
            &Status::progress(status::progress_message(action)),
        );
        tracing::info!(action = %action, "executing plan");

        match self.execute(&plan).await {
            Ok(report) => {
                tracing::info!(action = %action, summary = %report, "plan executed");
                let terminal = status::completion_status(&plan, &report);
                finish(&mut machine, Some(action), terminal, report)
            }
            Err(e) => {
                tracing::error!(action = %action, error = %e, "plan execution aborted");
                let message = match e {
                    EngineError::NoWindow => status::NO_WINDOW,
                    _ => status::COMMAND_FAILED,
                };
                finish(
                    &mut machine,
                    Some(action),
                    Status::error(message),
                    ReconcileReport::new(),
                )
            }
        }
    }

    async fn execute(&self, plan: &Plan) -> Result<ReconcileReport, EngineError> {
        let tabs = TabReconciler::new(self.session, self.resolver);
        let bookmarks = BookmarkReconciler::new(self.session);

        match plan {
            Plan::OrganizeTabs(out) => {
                let window = focused_window(self.session).await?;
                tabs.organize_tabs(&window, &out.tabs).await
            }
            Plan::GenerateTabs(out) => {
                let window = focused_window(self.session).await?;
                tabs.generate_tabs(&window, &out.group_name, &out.tabs).await
            }
            Plan::SearchTabs(out) => tabs.search_tabs(&out.title).await,
            Plan::CloseTabs(out) => {
                let window = focused_window(self.session).await?;
                tabs.close_tabs(&window, &out.tabs).await
            }
            Plan::RemoveBookmarks(out) => Ok(bookmarks.remove_bookmarks(&out.bookmarks).await),
            Plan::SearchBookmarks(out) => {
                let window = focused_window(self.session).await?;
                bookmarks.search_bookmarks(&window, &out.bookmarks).await
            }
            Plan::OrganizeBookmarks(out) => {
                let mut report = bookmarks
                    .organize_bookmarks(&out.reorganized_bookmarks)
                    .await?;
                // Moves already applied stay in the report even if the
                // refreshed tree cannot be read.
                match bookmarks
                    .save_tabs_to_bookmark_folders(&out.tabs_to_add)
                    .await
                {
                    Ok(saved) => report.merge(saved),
                    Err(e) => report.failed("tabs_to_add", e),
                }
                Ok(report)
            }
        }
    }
}

fn finish(
    machine: &mut DispatchStateMachine<'_>,
    action: Option<PlanAction>,
    terminal: Status,
    report: ReconcileReport,
) -> DispatchOutcome {
    let to = if terminal.is_error() {
        DispatchState::Failed
    } else {
        DispatchState::Succeeded
    };
    machine.transition(to, &terminal);
    DispatchOutcome {
        action,
        state: machine.state(),
        status: terminal,
        report,
    }
}
