//! User-visible status updates.
//!
//! An invocation publishes a handful of short messages: progress while it
//! works and exactly one terminal success or error. Per-item detail never
//! goes here; it goes to the log and the reconcile report.

use std::fmt;

use crate::plan::{Plan, PlanAction};
use crate::reconcile::ReconcileReport;

pub const EXECUTING: &str = "Executing command…";
pub const UNKNOWN_ACTION: &str = "Unknown action returned from agent.";
pub const MALFORMED_PLAN: &str = "Malformed plan returned from agent.";
pub const BACKEND_ERROR: &str = "Backend error";
pub const COMMAND_FAILED: &str = "Failed to execute command.";
pub const NO_WINDOW: &str = "No browser window found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Progress,
    Success,
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress => write!(f, "progress"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn progress(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Progress,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receiver of status updates (a UI, a terminal, a test recorder).
pub trait StatusSink: Send + Sync {
    fn publish(&self, status: &Status);
}

const _: () = {
    fn _assert_object_safe(_: &dyn StatusSink) {}
};

/// Sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn publish(&self, status: &Status) {
        match status.kind {
            StatusKind::Error => tracing::warn!(status = %status.message, "status"),
            kind => tracing::info!(kind = %kind, status = %status.message, "status"),
        }
    }
}

/// Progress message shown while a plan of this kind executes.
pub fn progress_message(action: PlanAction) -> &'static str {
    match action {
        PlanAction::OrganizeTabs => "Organizing tabs…",
        PlanAction::GenerateTabs => "Generating tabs…",
        PlanAction::SearchTabs => "Searching tabs…",
        PlanAction::CloseTabs => "Cleaning up your tabs…",
        PlanAction::RemoveBookmarks => "Removing bookmarks…",
        PlanAction::SearchBookmarks => "Searching bookmarks…",
        PlanAction::OrganizeBookmarks => "Organizing bookmarks…",
    }
}

/// Terminal status for a plan that ran to completion.
///
/// Batch plans succeed even when some items were skipped or failed. Plans
/// whose whole point is a single effect (switching to a tab, opening a
/// bookmark, generating tabs) fail when that effect did not happen.
pub fn completion_status(plan: &Plan, report: &ReconcileReport) -> Status {
    let anything = report.applied_count() > 0;
    match plan {
        Plan::OrganizeTabs(_) => Status::success("Tabs organized successfully!"),
        Plan::GenerateTabs(out) if anything => {
            Status::success(format!("Your tabs are saved in: {}", out.group_name))
        }
        Plan::GenerateTabs(_) => Status::error("No tabs could be generated."),
        Plan::SearchTabs(_) if anything => Status::success("Your tab was found!"),
        Plan::SearchTabs(_) => Status::error("No matching tab found."),
        Plan::CloseTabs(_) => Status::success("Your tabs have been cleaned up!"),
        Plan::RemoveBookmarks(_) => Status::success("Your bookmarks have been removed!"),
        Plan::SearchBookmarks(_) if anything => Status::success("Opened your bookmark!"),
        Plan::SearchBookmarks(_) => Status::error("No matching bookmark to open."),
        Plan::OrganizeBookmarks(_) => Status::success("Bookmarks organized successfully!"),
    }
}
