//! Snapshot builder: the read-only projection of the session sent to the
//! planner as context.

use serde::{Deserialize, Serialize};

use tabi_session::BrowserSession;
use tabi_session::models::{BookmarkNode, Tab, TabGroup, Window, WindowKind};

use crate::error::EngineError;
use crate::plan::UNGROUPED;

/// Name given to groups that have no title.
pub const UNNAMED_GROUP: &str = "Unnamed Group";

/// A tab as the planner sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTab {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl From<&Tab> for SnapshotTab {
    fn from(tab: &Tab) -> Self {
        Self {
            title: tab.title.clone(),
            url: tab.url.clone(),
            // Tabs carry no description of their own; the title stands in.
            description: tab.title.clone(),
        }
    }
}

/// One group of the snapshot, in live enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotGroup {
    pub group_name: String,
    pub tabs: Vec<SnapshotTab>,
}

/// Context attached to a planner request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanContext {
    pub tabs: Vec<SnapshotGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks: Option<Vec<BookmarkNode>>,
}

/// Pick the window to act on: the focused normal window, else the first
/// normal window.
pub async fn focused_window(session: &dyn BrowserSession) -> Result<Window, EngineError> {
    let windows = session.windows().await?;
    let mut normal = windows.into_iter().filter(|w| w.kind == WindowKind::Normal);
    let first = normal.next().ok_or(EngineError::NoWindow)?;
    if first.focused {
        return Ok(first);
    }
    Ok(normal.find(|w| w.focused).unwrap_or(first))
}

/// Partition tabs by group.
///
/// Groups keep their enumeration order and empty groups are omitted;
/// ungrouped tabs form a trailing `"Ungrouped"` group when there are any.
pub fn group_snapshot(tabs: &[Tab], groups: &[TabGroup]) -> Vec<SnapshotGroup> {
    let mut snapshot: Vec<SnapshotGroup> = groups
        .iter()
        .filter_map(|group| {
            let members: Vec<SnapshotTab> = tabs
                .iter()
                .filter(|t| t.group_id == Some(group.id))
                .map(SnapshotTab::from)
                .collect();
            if members.is_empty() {
                return None;
            }
            let name = group
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(UNNAMED_GROUP);
            Some(SnapshotGroup {
                group_name: name.to_string(),
                tabs: members,
            })
        })
        .collect();

    let ungrouped: Vec<SnapshotTab> = tabs
        .iter()
        .filter(|t| t.group_id.is_none())
        .map(SnapshotTab::from)
        .collect();
    if !ungrouped.is_empty() {
        snapshot.push(SnapshotGroup {
            group_name: UNGROUPED.to_string(),
            tabs: ungrouped,
        });
    }
    snapshot
}

/// Read the focused window (and optionally the bookmark tree) into a
/// planner context.
pub async fn build_context(
    session: &dyn BrowserSession,
    window: &Window,
    include_bookmarks: bool,
) -> Result<PlanContext, EngineError> {
    let tabs = session.tabs(window.id).await?;
    let groups = session.tab_groups(window.id).await?;
    let grouped = group_snapshot(&tabs, &groups);

    let bookmarks = if include_bookmarks {
        Some(session.bookmark_tree().await?)
    } else {
        None
    };

    tracing::debug!(
        window_id = %window.id,
        tabs = tabs.len(),
        groups = grouped.len(),
        bookmarks = bookmarks.is_some(),
        "built session snapshot"
    );

    Ok(PlanContext {
        tabs: grouped,
        bookmarks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabi_session::models::{GroupColor, GroupId, TabId, WindowId};

    fn tab(id: i64, title: &str, group: Option<i64>) -> Tab {
        Tab {
            id: TabId(id),
            title: title.to_string(),
            url: format!("https://example.com/{id}"),
            group_id: group.map(GroupId),
            window_id: WindowId(1),
            last_accessed: None,
            active: false,
        }
    }

    fn group(id: i64, title: Option<&str>) -> TabGroup {
        TabGroup {
            id: GroupId(id),
            title: title.map(str::to_string),
            color: GroupColor::Blue,
            collapsed: false,
            window_id: WindowId(1),
        }
    }

    #[test]
    fn partitions_in_group_order_with_ungrouped_last() {
        let tabs = vec![
            tab(1, "Loose", None),
            tab(2, "Paper", Some(20)),
            tab(3, "Repo", Some(10)),
            tab(4, "Notes", Some(20)),
        ];
        let groups = vec![group(20, Some("Research")), group(10, Some("Dev"))];

        let snapshot = group_snapshot(&tabs, &groups);
        let names: Vec<_> = snapshot.iter().map(|g| g.group_name.as_str()).collect();
        assert_eq!(names, vec!["Research", "Dev", "Ungrouped"]);
        assert_eq!(snapshot[0].tabs.len(), 2);
        assert_eq!(snapshot[0].tabs[1].title, "Notes");
        assert_eq!(snapshot[2].tabs[0].description, "Loose");
    }

    #[test]
    fn untitled_groups_are_unnamed_and_empty_groups_dropped() {
        let tabs = vec![tab(1, "A", Some(1)), tab(2, "B", Some(3))];
        let groups = vec![group(1, None), group(2, Some("Empty")), group(3, Some(""))];

        let snapshot = group_snapshot(&tabs, &groups);
        let names: Vec<_> = snapshot.iter().map(|g| g.group_name.as_str()).collect();
        assert_eq!(names, vec![UNNAMED_GROUP, UNNAMED_GROUP]);
    }

    #[test]
    fn no_ungrouped_entry_when_every_tab_is_grouped() {
        let tabs = vec![tab(1, "A", Some(1))];
        let snapshot = group_snapshot(&tabs, &[group(1, Some("G"))]);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn context_omits_absent_bookmarks_when_serialized() {
        let ctx = PlanContext {
            tabs: vec![],
            bookmarks: None,
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, serde_json::json!({"tabs": []}));
    }
}
