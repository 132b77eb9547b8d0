//! Bookmark reconciler: remove, search/open, reorganize and save tabs into
//! folders.

use std::collections::HashMap;

use futures::future::join_all;

use tabi_session::BrowserSession;
use tabi_session::models::{BookmarkId, BookmarkNode, NewBookmark, NewTab, Window};

use crate::error::EngineError;
use crate::plan::{BookmarkHit, BookmarkRef, TabToFolder, TargetNode};
use crate::reconcile::{ReconcileReport, normal_window_tabs};
use crate::resolve::{find_folder, find_tab_by_url};

/// Where a live node sits and whether it can hold children.
#[derive(Debug, Clone)]
struct LiveEntry {
    parent: Option<BookmarkId>,
    is_folder: bool,
}

/// Parent/kind index over the live tree, kept current as nodes move so
/// later decisions in the same pass see earlier moves.
#[derive(Debug, Default)]
struct LiveIndex {
    entries: HashMap<BookmarkId, LiveEntry>,
}

impl LiveIndex {
    fn build(roots: &[BookmarkNode]) -> Self {
        let mut entries = HashMap::new();
        for root in roots {
            root.walk(&mut |node, parent| {
                entries.insert(
                    node.id.clone(),
                    LiveEntry {
                        parent: parent.cloned(),
                        is_folder: node.is_folder(),
                    },
                );
            });
        }
        Self { entries }
    }

    fn contains(&self, id: &BookmarkId) -> bool {
        self.entries.contains_key(id)
    }

    fn parent_of(&self, id: &BookmarkId) -> Option<&BookmarkId> {
        self.entries.get(id).and_then(|e| e.parent.as_ref())
    }

    fn is_folder(&self, id: &BookmarkId) -> bool {
        self.entries.get(id).is_some_and(|e| e.is_folder)
    }

    fn set_parent(&mut self, id: &BookmarkId, parent: &BookmarkId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.parent = Some(parent.clone());
        }
    }

    fn insert_folder(&mut self, id: BookmarkId, parent: &BookmarkId) {
        self.entries.insert(
            id,
            LiveEntry {
                parent: Some(parent.clone()),
                is_folder: true,
            },
        );
    }
}

/// One pending node of the target hierarchy and the live folder it belongs
/// under (`None` for target roots, which stay where they are).
struct Frame<'t> {
    node: &'t TargetNode,
    parent: Option<BookmarkId>,
}

/// Applies bookmark-oriented plans to a session.
///
/// Bookmarks are addressed by id, and folders by exact (normalized) title,
/// so no fuzzy title matching happens here.
pub struct BookmarkReconciler<'a> {
    session: &'a dyn BrowserSession,
}

impl<'a> BookmarkReconciler<'a> {
    pub fn new(session: &'a dyn BrowserSession) -> Self {
        Self { session }
    }

    /// Remove every referenced node (with its subtree). Removals are issued
    /// concurrently and each one stands alone.
    pub async fn remove_bookmarks(&self, refs: &[BookmarkRef]) -> ReconcileReport {
        let results = join_all(refs.iter().map(|r| async move {
            (r, self.session.remove_bookmark_tree(&r.id).await)
        }))
        .await;

        let mut report = ReconcileReport::new();
        for (r, result) in results {
            match result {
                Ok(()) => {
                    tracing::info!(bookmark_id = %r.id, "removed bookmark");
                    report.applied(r.id.as_str());
                }
                Err(e) => report.failed(r.id.as_str(), e),
            }
        }
        report
    }

    /// Open the first hit. An already-open tab showing its URL is focused
    /// instead of opening a duplicate.
    pub async fn search_bookmarks(
        &self,
        window: &Window,
        hits: &[BookmarkHit],
    ) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();
        let Some(hit) = hits.first() else {
            tracing::warn!("planner returned no bookmark candidates");
            return Ok(report);
        };
        let Some(url) = hit.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            report.skipped(&hit.title, "bookmark has no URL");
            return Ok(report);
        };

        let open = normal_window_tabs(self.session).await?;
        if let Some(tab) = find_tab_by_url(&open, url) {
            let switched = async {
                self.session.focus_window(tab.window_id).await?;
                self.session.activate_tab(tab.id).await
            };
            match switched.await {
                Ok(()) => {
                    tracing::info!(tab_id = %tab.id, url = %url, "bookmark already open; switched to it");
                    report.applied(url);
                }
                Err(e) => report.failed(url, e),
            }
            return Ok(report);
        }

        let new_tab = NewTab {
            url: url.to_string(),
            active: true,
            window_id: Some(window.id),
        };
        match self.session.create_tab(new_tab).await {
            Ok(tab) => {
                tracing::info!(tab_id = %tab.id, url = %url, "opened bookmark");
                report.applied(url);
            }
            Err(e) => report.failed(url, e),
        }
        Ok(report)
    }

    /// Move live nodes so the tree matches `target`.
    ///
    /// The target is walked pre-order from the roots down, so a parent is in
    /// place before its children are moved into it. Target roots themselves
    /// are never moved. Missing folders below a root are created; other
    /// unknown ids are skipped along with their subtrees. Children listed
    /// under a non-folder are ignored.
    pub async fn organize_bookmarks(
        &self,
        target: &[TargetNode],
    ) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();
        let tree = self.session.bookmark_tree().await?;
        let mut index = LiveIndex::build(&tree);

        let mut stack: Vec<Frame<'_>> = target
            .iter()
            .rev()
            .map(|node| Frame { node, parent: None })
            .collect();

        while let Some(Frame { node, parent }) = stack.pop() {
            let label = node_label(node);

            let live_id = match node.id.as_ref().filter(|id| index.contains(id)) {
                Some(id) => id.clone(),
                None => match (&parent, node.is_folder()) {
                    (Some(parent), true) => {
                        let created = self
                            .session
                            .create_bookmark(NewBookmark {
                                parent_id: parent.clone(),
                                title: node.title.clone(),
                                url: None,
                            })
                            .await;
                        match created {
                            Ok(folder) => {
                                tracing::info!(
                                    bookmark_id = %folder.id,
                                    parent_id = %parent,
                                    title = %node.title,
                                    "created bookmark folder"
                                );
                                index.insert_folder(folder.id.clone(), parent);
                                report.applied(&label);
                                folder.id
                            }
                            Err(e) => {
                                report.failed(&label, e);
                                skip_descendants(
                                    node,
                                    "parent folder could not be created",
                                    &mut report,
                                );
                                continue;
                            }
                        }
                    }
                    _ => {
                        report.skipped(&label, "no live bookmark with this id");
                        if node.is_folder() {
                            skip_descendants(node, "parent folder not found", &mut report);
                        }
                        continue;
                    }
                },
            };

            if let Some(parent) = &parent {
                if index.parent_of(&live_id) == Some(parent) {
                    tracing::debug!(bookmark_id = %live_id, "bookmark already in place");
                } else {
                    match self.session.move_bookmark(&live_id, parent).await {
                        Ok(()) => {
                            tracing::info!(
                                bookmark_id = %live_id,
                                parent_id = %parent,
                                "moved bookmark"
                            );
                            index.set_parent(&live_id, parent);
                            report.applied(&label);
                        }
                        Err(e) => report.failed(&label, e),
                    }
                }
            }

            if node.children.is_empty() {
                continue;
            }
            if !node.is_folder() || !index.is_folder(&live_id) {
                tracing::warn!(
                    bookmark_id = %live_id,
                    children = node.children.len(),
                    "bookmark is not a folder; ignoring its children"
                );
                continue;
            }
            stack.extend(node.children.iter().rev().map(|child| Frame {
                node: child,
                parent: Some(live_id.clone()),
            }));
        }

        Ok(report)
    }

    /// Bookmark tabs into existing folders, found by title in a fresh read
    /// of the tree. Unknown folders and tabs without a URL are skipped.
    pub async fn save_tabs_to_bookmark_folders(
        &self,
        mappings: &[TabToFolder],
    ) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();
        if mappings.is_empty() {
            return Ok(report);
        }
        let tree = self.session.bookmark_tree().await?;

        for mapping in mappings {
            let Some(url) = mapping.tab_url.as_deref().filter(|u| !u.trim().is_empty()) else {
                report.skipped(&mapping.tab_title, "tab has no URL");
                continue;
            };
            let Some(folder) = find_folder(&tree, &mapping.folder_title) else {
                report.skipped(
                    &mapping.tab_title,
                    format!("no bookmark folder named {:?}", mapping.folder_title),
                );
                continue;
            };

            let created = self
                .session
                .create_bookmark(NewBookmark {
                    parent_id: folder.id.clone(),
                    title: mapping.tab_title.clone(),
                    url: Some(url.to_string()),
                })
                .await;
            match created {
                Ok(node) => {
                    tracing::info!(
                        bookmark_id = %node.id,
                        folder = %folder.title,
                        url = %url,
                        "saved tab to bookmark folder"
                    );
                    report.applied(&mapping.tab_title);
                }
                Err(e) => report.failed(&mapping.tab_title, e),
            }
        }
        Ok(report)
    }
}

/// Record every node below `node` as skipped, in pre-order.
fn skip_descendants(node: &TargetNode, reason: &str, report: &mut ReconcileReport) {
    let mut stack: Vec<&TargetNode> = node.children.iter().rev().collect();
    while let Some(child) = stack.pop() {
        report.skipped(node_label(child), reason);
        stack.extend(child.children.iter().rev());
    }
}

fn node_label(node: &TargetNode) -> String {
    match (&node.id, node.title.is_empty()) {
        (_, false) => node.title.clone(),
        (Some(id), true) => id.to_string(),
        (None, true) => String::from("(untitled)"),
    }
}
