//! Browser session model and adapter interface.
//!
//! Holds the data model shared by the engine (windows, tabs, tab groups,
//! bookmark nodes), the [`BrowserSession`] trait every session backend
//! implements, and [`MemorySession`], an in-process backend that can be
//! persisted as JSON.

pub mod memory;
pub mod models;
pub mod session;
pub mod store;

pub use memory::{MemorySession, SessionState};
pub use session::{BrowserSession, SessionError};
pub use store::{StoreError, load_session, save_session};
