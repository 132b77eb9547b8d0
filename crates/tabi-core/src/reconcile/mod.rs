//! Reconcilers: turn a plan's payload into browser session mutations.
//!
//! Every reconciler is best-effort. Each plan item is resolved and mutated
//! on its own; a miss or a failed call is recorded in the
//! [`ReconcileReport`] and the loop moves on. Nothing already applied is
//! rolled back.

pub mod bookmarks;
pub mod tabs;

use std::fmt;

use tabi_session::BrowserSession;
use tabi_session::models::{Tab, WindowKind};

use crate::error::EngineError;

pub use bookmarks::BookmarkReconciler;
pub use tabs::TabReconciler;

/// Every tab of every normal window, in window then tab order.
///
/// A window that cannot be read (usually one closed since it was listed)
/// contributes no tabs.
pub(crate) async fn normal_window_tabs(
    session: &dyn BrowserSession,
) -> Result<Vec<Tab>, EngineError> {
    let mut tabs = Vec::new();
    for window in session.windows().await? {
        if window.kind != WindowKind::Normal {
            continue;
        }
        match session.tabs(window.id).await {
            Ok(window_tabs) => tabs.extend(window_tabs),
            Err(e) => {
                tracing::warn!(window_id = %window.id, error = %e, "skipping unreadable window");
            }
        }
    }
    Ok(tabs)
}

/// What happened to one plan item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The mutation was issued and accepted.
    Applied,
    /// Nothing was done: no live counterpart, or nothing to change.
    Skipped { reason: String },
    /// The session rejected the mutation.
    Failed { error: String },
}

/// Outcome for a single plan item, labelled by the title/id/URL the plan
/// used for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub item: String,
    pub outcome: ItemOutcome,
}

/// Per-item results of one reconciler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub items: Vec<ItemReport>,
}

impl ReconcileReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&mut self, item: impl Into<String>) {
        self.items.push(ItemReport {
            item: item.into(),
            outcome: ItemOutcome::Applied,
        });
    }

    pub fn skipped(&mut self, item: impl Into<String>, reason: impl Into<String>) {
        let item = item.into();
        let reason = reason.into();
        tracing::warn!(item = %item, reason = %reason, "skipped plan item");
        self.items.push(ItemReport {
            item,
            outcome: ItemOutcome::Skipped { reason },
        });
    }

    pub fn failed(&mut self, item: impl Into<String>, error: impl fmt::Display) {
        let item = item.into();
        let error = error.to_string();
        tracing::warn!(item = %item, error = %error, "plan item failed");
        self.items.push(ItemReport {
            item,
            outcome: ItemOutcome::Failed { error },
        });
    }

    /// Append another report's items.
    pub fn merge(&mut self, other: ReconcileReport) {
        self.items.extend(other.items);
    }

    pub fn applied_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Applied))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} skipped, {} failed",
            self.applied_count(),
            self.skipped_count(),
            self.failed_count()
        )
    }
}
