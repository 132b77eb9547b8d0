use chrono::{TimeZone, Utc};

use tabi_session::models::{
    BookmarkNode, GroupColor, GroupId, Tab, TabGroup, TabId, Window, WindowId, WindowKind,
};
use tabi_session::{MemorySession, SessionState};

/// Builder for [`SessionState`] fixtures.
///
/// Ids are given explicitly so tests can refer to them afterwards.
#[derive(Debug, Default)]
pub struct SessionStateBuilder {
    state: SessionState,
}

impl SessionStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(mut self, id: i64, focused: bool) -> Self {
        self.state.windows.push(Window {
            id: WindowId(id),
            focused,
            kind: WindowKind::Normal,
        });
        self
    }

    pub fn popup(mut self, id: i64, focused: bool) -> Self {
        self.state.windows.push(Window {
            id: WindowId(id),
            focused,
            kind: WindowKind::Popup,
        });
        self
    }

    pub fn tab(mut self, id: i64, window: i64, title: &str, url: &str) -> Self {
        self.state.tabs.push(Tab {
            id: TabId(id),
            title: title.to_string(),
            url: url.to_string(),
            group_id: None,
            window_id: WindowId(window),
            last_accessed: None,
            active: false,
        });
        self
    }

    /// Add a tab inside group `group` (declare the group with [`Self::group`]).
    pub fn grouped_tab(mut self, id: i64, window: i64, title: &str, url: &str, group: i64) -> Self {
        self = self.tab(id, window, title, url);
        if let Some(tab) = self.state.tabs.last_mut() {
            tab.group_id = Some(GroupId(group));
        }
        self
    }

    /// Set a tab's last access time, in seconds since the epoch.
    pub fn accessed(mut self, tab: i64, secs: i64) -> Self {
        if let Some(t) = self.state.tabs.iter_mut().find(|t| t.id == TabId(tab)) {
            t.last_accessed = Utc.timestamp_opt(secs, 0).single();
        }
        self
    }

    pub fn group(mut self, id: i64, window: i64, title: &str) -> Self {
        self.state.groups.push(TabGroup {
            id: GroupId(id),
            title: Some(title.to_string()),
            color: GroupColor::Grey,
            collapsed: false,
            window_id: WindowId(window),
        });
        self
    }

    pub fn bookmarks(mut self, roots: Vec<BookmarkNode>) -> Self {
        self.state.bookmarks = roots;
        self
    }

    pub fn build(self) -> SessionState {
        self.state
    }

    pub fn session(self) -> MemorySession {
        MemorySession::from_state(self.state)
    }
}
