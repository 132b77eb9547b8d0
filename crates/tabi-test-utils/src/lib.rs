//! Shared test utilities for tabi integration tests.
//!
//! - [`SessionStateBuilder`]: terse fixtures for windows, tabs, groups and
//!   bookmarks.
//! - [`RecordingSession`]: a [`MemorySession`] that records every mutation
//!   and can be told to reject specific calls.
//! - [`spawn_fake_planner`]: an HTTP planner on a random local port that
//!   answers every request with a canned status and body.

mod fixture;
mod planner;
mod recording;

pub use fixture::SessionStateBuilder;
pub use planner::{FakePlanner, spawn_fake_planner};
pub use recording::{Failure, RecordingSession, SessionCall};

pub use tabi_session::MemorySession;
