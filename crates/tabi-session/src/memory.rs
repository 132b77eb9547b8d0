//! In-process browser session.
//!
//! [`MemorySession`] models windows, tabs, tab groups and the bookmark tree
//! and enforces the same invariants a real browser does:
//!
//! - a tab group exists only while it holds at least one tab;
//! - bookmark roots can be neither moved nor removed;
//! - only folders accept children, and a node cannot be moved into its own
//!   subtree;
//! - a batch tab close fails as a whole when any handle is unknown.
//!
//! The state serializes to JSON (see [`crate::store`]), which is how the CLI
//! persists a session between invocations.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::{
    BookmarkId, BookmarkNode, GroupColor, GroupId, GroupUpdate, NewBookmark, NewTab, Tab,
    TabGroup, TabId, Window, WindowId, WindowKind,
};
use crate::session::{BrowserSession, SessionError};

/// Serializable state of a browser session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub windows: Vec<Window>,
    #[serde(default)]
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub groups: Vec<TabGroup>,
    #[serde(default)]
    pub bookmarks: Vec<BookmarkNode>,
}

impl SessionState {
    /// Drop groups that no longer hold any tab.
    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        self.groups
            .retain(|g| tabs.iter().any(|t| t.group_id == Some(g.id)));
    }

    fn window(&self, id: WindowId) -> Result<&Window, SessionError> {
        self.windows
            .iter()
            .find(|w| w.id == id)
            .ok_or(SessionError::NoSuchWindow(id))
    }

    fn tab_mut(&mut self, id: TabId) -> Result<&mut Tab, SessionError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(SessionError::NoSuchTab(id))
    }

    /// The focused normal window, or the first normal one.
    fn default_window(&self) -> Option<WindowId> {
        let normal = || self.windows.iter().filter(|w| w.kind == WindowKind::Normal);
        normal()
            .find(|w| w.focused)
            .or_else(|| normal().next())
            .map(|w| w.id)
    }
}

/// Counters for handing out fresh handles.
#[derive(Debug)]
struct Inner {
    state: SessionState,
    next_tab: i64,
    next_group: i64,
    next_bookmark: u64,
}

impl Inner {
    fn new(mut state: SessionState) -> Self {
        state.prune_groups();
        let next_tab = state.tabs.iter().map(|t| t.id.0).max().unwrap_or(0) + 1;
        let next_group = state.groups.iter().map(|g| g.id.0).max().unwrap_or(0) + 1;
        let mut max_bookmark = 0u64;
        for root in &state.bookmarks {
            root.walk(&mut |node, _| {
                if let Ok(n) = node.id.as_str().parse::<u64>() {
                    max_bookmark = max_bookmark.max(n);
                }
            });
        }
        Self {
            state,
            next_tab,
            next_group,
            next_bookmark: max_bookmark + 1,
        }
    }
}

/// A browser session held entirely in memory.
#[derive(Debug)]
pub struct MemorySession {
    inner: Mutex<Inner>,
}

impl MemorySession {
    /// Build a session from an explicit state. Empty groups are dropped.
    pub fn from_state(state: SessionState) -> Self {
        Self {
            inner: Mutex::new(Inner::new(state)),
        }
    }

    /// Return a copy of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::from_state(SessionState::default())
    }
}

// ---------------------------------------------------------------------------
// Bookmark tree helpers
// ---------------------------------------------------------------------------

fn find_node<'a>(nodes: &'a [BookmarkNode], id: &BookmarkId) -> Option<&'a BookmarkNode> {
    for node in nodes {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_node_mut<'a>(
    nodes: &'a mut [BookmarkNode],
    id: &BookmarkId,
) -> Option<&'a mut BookmarkNode> {
    for node in nodes {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Remove a non-root node from the tree and return it.
fn detach(nodes: &mut [BookmarkNode], id: &BookmarkId) -> Option<BookmarkNode> {
    for node in nodes {
        if let Some(pos) = node.children.iter().position(|c| c.id == *id) {
            return Some(node.children.remove(pos));
        }
        if let Some(found) = detach(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn invalid(id: &BookmarkId, reason: &str) -> SessionError {
    SessionError::InvalidBookmarkOperation {
        id: id.clone(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// BrowserSession
// ---------------------------------------------------------------------------

#[async_trait]
impl BrowserSession for MemorySession {
    async fn windows(&self) -> Result<Vec<Window>, SessionError> {
        Ok(self.inner.lock().state.windows.clone())
    }

    async fn tabs(&self, window_id: WindowId) -> Result<Vec<Tab>, SessionError> {
        let inner = self.inner.lock();
        inner.state.window(window_id)?;
        Ok(inner
            .state
            .tabs
            .iter()
            .filter(|t| t.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn tab_groups(&self, window_id: WindowId) -> Result<Vec<TabGroup>, SessionError> {
        let inner = self.inner.lock();
        inner.state.window(window_id)?;
        Ok(inner
            .state
            .groups
            .iter()
            .filter(|g| g.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>, SessionError> {
        Ok(self.inner.lock().state.bookmarks.clone())
    }

    async fn create_tab(&self, tab: NewTab) -> Result<Tab, SessionError> {
        let mut inner = self.inner.lock();
        let window_id = match tab.window_id {
            Some(id) => inner.state.window(id)?.id,
            None => inner
                .state
                .default_window()
                .ok_or_else(|| SessionError::Rejected("no window to open a tab in".into()))?,
        };

        if tab.active {
            for t in inner.state.tabs.iter_mut().filter(|t| t.window_id == window_id) {
                t.active = false;
            }
        }

        let id = TabId(inner.next_tab);
        inner.next_tab += 1;
        let created = Tab {
            id,
            // The page is never loaded here, so the URL doubles as the title.
            title: tab.url.clone(),
            url: tab.url,
            group_id: None,
            window_id,
            last_accessed: tab.active.then(Utc::now),
            active: tab.active,
        };
        inner.state.tabs.push(created.clone());
        Ok(created)
    }

    async fn activate_tab(&self, tab_id: TabId) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        let window_id = inner.state.tab_mut(tab_id)?.window_id;
        for t in inner.state.tabs.iter_mut().filter(|t| t.window_id == window_id) {
            t.active = t.id == tab_id;
            if t.active {
                t.last_accessed = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn focus_window(&self, window_id: WindowId) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.state.window(window_id)?;
        for w in inner.state.windows.iter_mut() {
            w.focused = w.id == window_id;
        }
        Ok(())
    }

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        for id in tab_ids {
            if !inner.state.tabs.iter().any(|t| t.id == *id) {
                return Err(SessionError::NoSuchTab(*id));
            }
        }
        inner.state.tabs.retain(|t| !tab_ids.contains(&t.id));
        inner.state.prune_groups();
        Ok(())
    }

    async fn group_tabs(
        &self,
        tab_ids: &[TabId],
        group: Option<GroupId>,
        window_id: WindowId,
    ) -> Result<GroupId, SessionError> {
        if tab_ids.is_empty() {
            return Err(SessionError::EmptyGroup);
        }

        let mut inner = self.inner.lock();
        for id in tab_ids {
            if !inner.state.tabs.iter().any(|t| t.id == *id) {
                return Err(SessionError::NoSuchTab(*id));
            }
        }

        let (group_id, target_window) = match group {
            Some(id) => {
                let existing = inner
                    .state
                    .groups
                    .iter()
                    .find(|g| g.id == id)
                    .ok_or(SessionError::NoSuchGroup(id))?;
                (existing.id, existing.window_id)
            }
            None => {
                inner.state.window(window_id)?;
                let id = GroupId(inner.next_group);
                inner.next_group += 1;
                inner.state.groups.push(TabGroup {
                    id,
                    title: None,
                    color: GroupColor::Grey,
                    collapsed: false,
                    window_id,
                });
                (id, window_id)
            }
        };

        for t in inner.state.tabs.iter_mut().filter(|t| tab_ids.contains(&t.id)) {
            t.group_id = Some(group_id);
            t.window_id = target_window;
        }
        inner.state.prune_groups();
        Ok(group_id)
    }

    async fn ungroup_tab(&self, tab_id: TabId) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.state.tab_mut(tab_id)?.group_id = None;
        inner.state.prune_groups();
        Ok(())
    }

    async fn update_group(
        &self,
        group_id: GroupId,
        update: GroupUpdate,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        let group = inner
            .state
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(SessionError::NoSuchGroup(group_id))?;
        if let Some(title) = update.title {
            group.title = Some(title);
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        Ok(())
    }

    async fn remove_bookmark_tree(&self, id: &BookmarkId) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        let roots = &mut inner.state.bookmarks;
        if roots.iter().any(|r| r.id == *id) {
            return Err(invalid(id, "the root cannot be removed"));
        }
        detach(roots, id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NoSuchBookmark(id.clone()))
    }

    async fn move_bookmark(
        &self,
        id: &BookmarkId,
        parent: &BookmarkId,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        let roots = &mut inner.state.bookmarks;
        if roots.iter().any(|r| r.id == *id) {
            return Err(invalid(id, "the root cannot be moved"));
        }

        let node = find_node(roots, id).ok_or_else(|| SessionError::NoSuchBookmark(id.clone()))?;
        let target =
            find_node(roots, parent).ok_or_else(|| SessionError::NoSuchBookmark(parent.clone()))?;
        if !target.is_folder() {
            return Err(invalid(id, "the new parent is not a folder"));
        }
        if node.contains(parent) {
            return Err(invalid(id, "a node cannot be moved into its own subtree"));
        }

        let node = detach(roots, id).ok_or_else(|| SessionError::NoSuchBookmark(id.clone()))?;
        find_node_mut(roots, parent)
            .ok_or_else(|| SessionError::NoSuchBookmark(parent.clone()))?
            .children
            .push(node);
        Ok(())
    }

    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<BookmarkNode, SessionError> {
        let mut inner = self.inner.lock();
        let id = BookmarkId(inner.next_bookmark.to_string());
        let parent = find_node_mut(&mut inner.state.bookmarks, &bookmark.parent_id)
            .ok_or_else(|| SessionError::NoSuchBookmark(bookmark.parent_id.clone()))?;
        if !parent.is_folder() {
            return Err(invalid(&bookmark.parent_id, "bookmarks cannot hold children"));
        }

        let node = BookmarkNode {
            id,
            title: bookmark.title,
            url: bookmark.url,
            children: Vec::new(),
        };
        parent.children.push(node.clone());
        inner.next_bookmark += 1;
        Ok(node)
    }
}
