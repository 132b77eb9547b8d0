use async_trait::async_trait;
use parking_lot::Mutex;

use tabi_session::models::{
    BookmarkId, BookmarkNode, GroupId, GroupUpdate, NewBookmark, NewTab, Tab, TabGroup, TabId,
    Window, WindowId, WindowKind,
};
use tabi_session::{BrowserSession, MemorySession, SessionError, SessionState};

/// A mutation issued against a [`RecordingSession`], in call order.
/// Rejected calls are recorded too.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    CreateTab(NewTab),
    ActivateTab(TabId),
    FocusWindow(WindowId),
    RemoveTabs(Vec<TabId>),
    GroupTabs {
        tab_ids: Vec<TabId>,
        group: Option<GroupId>,
        window_id: WindowId,
    },
    UngroupTab(TabId),
    UpdateGroup(GroupId, GroupUpdate),
    RemoveBookmarkTree(BookmarkId),
    MoveBookmark {
        id: BookmarkId,
        parent: BookmarkId,
    },
    CreateBookmark(NewBookmark),
}

/// A call the session should reject with [`SessionError::Rejected`].
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    CreateTab { url: String },
    RemoveTabs { containing: TabId },
    UngroupTab(TabId),
    MoveBookmark(BookmarkId),
    RemoveBookmark(BookmarkId),
    /// Reject creating a bookmark or folder with this title.
    CreateBookmark { title: String },
}

impl Failure {
    fn matches(&self, call: &SessionCall) -> bool {
        match (self, call) {
            (Failure::CreateTab { url }, SessionCall::CreateTab(tab)) => tab.url == *url,
            (Failure::RemoveTabs { containing }, SessionCall::RemoveTabs(ids)) => {
                ids.contains(containing)
            }
            (Failure::UngroupTab(a), SessionCall::UngroupTab(b)) => a == b,
            (Failure::MoveBookmark(a), SessionCall::MoveBookmark { id, .. }) => a == id,
            (Failure::RemoveBookmark(a), SessionCall::RemoveBookmarkTree(b)) => a == b,
            (Failure::CreateBookmark { title }, SessionCall::CreateBookmark(b)) => b.title == *title,
            _ => false,
        }
    }
}

/// [`MemorySession`] wrapper that records mutations and injects failures.
#[derive(Debug, Default)]
pub struct RecordingSession {
    inner: MemorySession,
    calls: Mutex<Vec<SessionCall>>,
    failures: Mutex<Vec<Failure>>,
    closed_windows: Vec<WindowId>,
    tree_read_limit: Option<usize>,
    tree_reads: Mutex<usize>,
}

impl RecordingSession {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: MemorySession::from_state(state),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            closed_windows: Vec::new(),
            tree_read_limit: None,
            tree_reads: Mutex::new(0),
        }
    }

    /// Reject every future call matching `failure`.
    pub fn fail_on(self, failure: Failure) -> Self {
        self.failures.lock().push(failure);
        self
    }

    /// Keep listing a normal window that has already closed. Reading its
    /// tabs fails with [`SessionError::NoSuchWindow`].
    pub fn with_closed_window(mut self, id: i64) -> Self {
        self.closed_windows.push(WindowId(id));
        self
    }

    /// Let the first `reads` bookmark tree reads through and reject the rest.
    pub fn fail_tree_reads_after(mut self, reads: usize) -> Self {
        self.tree_read_limit = Some(reads);
        self
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().clone()
    }

    /// `(id, parent)` of every attempted bookmark move, in order.
    pub fn moves(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                SessionCall::MoveBookmark { id, parent } => {
                    Some((id.as_str().to_string(), parent.as_str().to_string()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    fn record(&self, call: SessionCall) -> Result<(), SessionError> {
        let rejected = self.failures.lock().iter().any(|f| f.matches(&call));
        self.calls.lock().push(call);
        if rejected {
            return Err(SessionError::Rejected("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for RecordingSession {
    async fn windows(&self) -> Result<Vec<Window>, SessionError> {
        let mut windows = self.inner.windows().await?;
        windows.extend(self.closed_windows.iter().map(|&id| Window {
            id,
            focused: false,
            kind: WindowKind::Normal,
        }));
        Ok(windows)
    }

    async fn tabs(&self, window_id: WindowId) -> Result<Vec<Tab>, SessionError> {
        self.inner.tabs(window_id).await
    }

    async fn tab_groups(&self, window_id: WindowId) -> Result<Vec<TabGroup>, SessionError> {
        self.inner.tab_groups(window_id).await
    }

    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>, SessionError> {
        let reads = {
            let mut reads = self.tree_reads.lock();
            *reads += 1;
            *reads
        };
        if self.tree_read_limit.is_some_and(|limit| reads > limit) {
            return Err(SessionError::Rejected("injected failure".into()));
        }
        self.inner.bookmark_tree().await
    }

    async fn create_tab(&self, tab: NewTab) -> Result<Tab, SessionError> {
        self.record(SessionCall::CreateTab(tab.clone()))?;
        self.inner.create_tab(tab).await
    }

    async fn activate_tab(&self, tab_id: TabId) -> Result<(), SessionError> {
        self.record(SessionCall::ActivateTab(tab_id))?;
        self.inner.activate_tab(tab_id).await
    }

    async fn focus_window(&self, window_id: WindowId) -> Result<(), SessionError> {
        self.record(SessionCall::FocusWindow(window_id))?;
        self.inner.focus_window(window_id).await
    }

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), SessionError> {
        self.record(SessionCall::RemoveTabs(tab_ids.to_vec()))?;
        self.inner.remove_tabs(tab_ids).await
    }

    async fn group_tabs(
        &self,
        tab_ids: &[TabId],
        group: Option<GroupId>,
        window_id: WindowId,
    ) -> Result<GroupId, SessionError> {
        self.record(SessionCall::GroupTabs {
            tab_ids: tab_ids.to_vec(),
            group,
            window_id,
        })?;
        self.inner.group_tabs(tab_ids, group, window_id).await
    }

    async fn ungroup_tab(&self, tab_id: TabId) -> Result<(), SessionError> {
        self.record(SessionCall::UngroupTab(tab_id))?;
        self.inner.ungroup_tab(tab_id).await
    }

    async fn update_group(&self, group_id: GroupId, update: GroupUpdate) -> Result<(), SessionError> {
        self.record(SessionCall::UpdateGroup(group_id, update.clone()))?;
        self.inner.update_group(group_id, update).await
    }

    async fn remove_bookmark_tree(&self, id: &BookmarkId) -> Result<(), SessionError> {
        self.record(SessionCall::RemoveBookmarkTree(id.clone()))?;
        self.inner.remove_bookmark_tree(id).await
    }

    async fn move_bookmark(&self, id: &BookmarkId, parent: &BookmarkId) -> Result<(), SessionError> {
        self.record(SessionCall::MoveBookmark {
            id: id.clone(),
            parent: parent.clone(),
        })?;
        self.inner.move_bookmark(id, parent).await
    }

    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<BookmarkNode, SessionError> {
        self.record(SessionCall::CreateBookmark(bookmark.clone()))?;
        self.inner.create_bookmark(bookmark).await
    }
}
