pub mod color;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod plan;
pub mod planner;
pub mod reconcile;
pub mod resolve;
pub mod snapshot;

pub use command::{CommandOptions, run_command};
pub use dispatch::{DispatchOutcome, DispatchState, Dispatcher, Status, StatusKind, StatusSink};
pub use error::EngineError;
pub use planner::{HttpPlanner, HttpPlannerConfig, PlanRequest, Planner, PlannerError};
