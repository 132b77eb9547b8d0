//! The `BrowserSession` trait -- the seam between the engine and a live
//! browser.
//!
//! Every call is asynchronous and may fail independently. The session is an
//! external, concurrently mutable resource: a handle read a moment ago may be
//! gone by the time it is mutated, in which case the call returns a
//! [`SessionError`] and the caller decides whether that item is fatal.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    BookmarkId, BookmarkNode, GroupId, GroupUpdate, NewBookmark, NewTab, Tab, TabGroup, TabId,
    Window, WindowId,
};

/// Errors returned by a browser session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("no tab with id {0}")]
    NoSuchTab(TabId),

    #[error("no tab group with id {0}")]
    NoSuchGroup(GroupId),

    #[error("no window with id {0}")]
    NoSuchWindow(WindowId),

    #[error("no bookmark node with id {0:?}")]
    NoSuchBookmark(BookmarkId),

    #[error("invalid bookmark operation on {id:?}: {reason}")]
    InvalidBookmarkOperation { id: BookmarkId, reason: String },

    #[error("cannot group an empty set of tabs")]
    EmptyGroup,

    #[error("session rejected the call: {0}")]
    Rejected(String),
}

/// Adapter interface for a browser session (windows, tabs, tab groups and
/// the bookmark tree).
///
/// # Object Safety
///
/// The trait is object-safe so reconcilers can take `&dyn BrowserSession`.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// All windows, in browser enumeration order.
    async fn windows(&self) -> Result<Vec<Window>, SessionError>;

    /// Tabs of one window, in tab-strip order.
    async fn tabs(&self, window_id: WindowId) -> Result<Vec<Tab>, SessionError>;

    /// Tab groups of one window, in enumeration order.
    async fn tab_groups(&self, window_id: WindowId) -> Result<Vec<TabGroup>, SessionError>;

    /// The full bookmark tree, starting at the root node(s).
    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>, SessionError>;

    /// Open a new tab.
    async fn create_tab(&self, tab: NewTab) -> Result<Tab, SessionError>;

    /// Make a tab the active tab of its window.
    async fn activate_tab(&self, tab_id: TabId) -> Result<(), SessionError>;

    /// Give a window focus.
    async fn focus_window(&self, window_id: WindowId) -> Result<(), SessionError>;

    /// Close a batch of tabs. The batch fails as a whole if any handle is
    /// unknown.
    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), SessionError>;

    /// Put tabs into `group` (or a new group created in `window_id` when
    /// `group` is `None`) and return the group handle.
    async fn group_tabs(
        &self,
        tab_ids: &[TabId],
        group: Option<GroupId>,
        window_id: WindowId,
    ) -> Result<GroupId, SessionError>;

    /// Remove a single tab from whatever group it is in.
    async fn ungroup_tab(&self, tab_id: TabId) -> Result<(), SessionError>;

    /// Change title/color/collapsed state of a group.
    async fn update_group(&self, group_id: GroupId, update: GroupUpdate)
    -> Result<(), SessionError>;

    /// Delete a bookmark node together with its whole subtree.
    async fn remove_bookmark_tree(&self, id: &BookmarkId) -> Result<(), SessionError>;

    /// Move a bookmark node (and its subtree) under a new parent folder.
    async fn move_bookmark(&self, id: &BookmarkId, parent: &BookmarkId)
    -> Result<(), SessionError>;

    /// Create a bookmark or folder and return the new node.
    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<BookmarkNode, SessionError>;
}

// Compile-time assertion: BrowserSession must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn BrowserSession) {}
};
