//! Invocation-level errors.
//!
//! Only environment and transport failures abort an invocation. Resolution
//! misses and per-item mutation failures are recorded in a
//! [`crate::reconcile::ReconcileReport`] instead.

use thiserror::Error;

use tabi_session::SessionError;

use crate::planner::PlannerError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The prompt was empty after trimming.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// No normal browser window to act on.
    #[error("no normal browser window found")]
    NoWindow,

    /// Reading session state failed before any mutation was attempted.
    #[error("failed to read browser session: {0}")]
    Session(#[from] SessionError),

    /// The planner could not be reached or answered with garbage.
    #[error(transparent)]
    Planner(#[from] PlannerError),
}
