//! Wire types for planner responses.
//!
//! A planner answers with `{action, output}`; the shape of `output` depends
//! on `action`. [`RawPlan`] is the untyped envelope, [`Plan`] the typed
//! result of [`super::parse_plan`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use tabi_session::models::BookmarkId;

/// Group name the planner uses for "no group at all".
pub const UNGROUPED: &str = "Ungrouped";

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// The closed set of actions a plan may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    OrganizeTabs,
    GenerateTabs,
    SearchTabs,
    CloseTabs,
    RemoveBookmarks,
    SearchBookmarks,
    OrganizeBookmarks,
}

impl PlanAction {
    pub const ALL: [PlanAction; 7] = [
        Self::OrganizeTabs,
        Self::GenerateTabs,
        Self::SearchTabs,
        Self::CloseTabs,
        Self::RemoveBookmarks,
        Self::SearchBookmarks,
        Self::OrganizeBookmarks,
    ];
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OrganizeTabs => "organize_tabs",
            Self::GenerateTabs => "generate_tabs",
            Self::SearchTabs => "search_tabs",
            Self::CloseTabs => "close_tabs",
            Self::RemoveBookmarks => "remove_bookmarks",
            Self::SearchBookmarks => "search_bookmarks",
            Self::OrganizeBookmarks => "organize_bookmarks",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanAction {
    type Err = PlanActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organize_tabs" => Ok(Self::OrganizeTabs),
            "generate_tabs" => Ok(Self::GenerateTabs),
            "search_tabs" => Ok(Self::SearchTabs),
            "close_tabs" => Ok(Self::CloseTabs),
            "remove_bookmarks" => Ok(Self::RemoveBookmarks),
            "search_bookmarks" => Ok(Self::SearchBookmarks),
            "organize_bookmarks" => Ok(Self::OrganizeBookmarks),
            other => Err(PlanActionParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unknown [`PlanAction`] string.
#[derive(Debug, Clone)]
pub struct PlanActionParseError(pub String);

impl fmt::Display for PlanActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown plan action: {:?}", self.0)
    }
}

impl std::error::Error for PlanActionParseError {}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The planner response as received: an action name and an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlan {
    pub action: String,
    #[serde(default)]
    pub output: Value,
}

/// A plan whose payload has been shape-checked for its action.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    OrganizeTabs(OrganizeTabsOutput),
    GenerateTabs(GenerateTabsOutput),
    SearchTabs(SearchTabsOutput),
    CloseTabs(CloseTabsOutput),
    RemoveBookmarks(RemoveBookmarksOutput),
    SearchBookmarks(SearchBookmarksOutput),
    OrganizeBookmarks(OrganizeBookmarksOutput),
}

impl Plan {
    pub fn action(&self) -> PlanAction {
        match self {
            Self::OrganizeTabs(_) => PlanAction::OrganizeTabs,
            Self::GenerateTabs(_) => PlanAction::GenerateTabs,
            Self::SearchTabs(_) => PlanAction::SearchTabs,
            Self::CloseTabs(_) => PlanAction::CloseTabs,
            Self::RemoveBookmarks(_) => PlanAction::RemoveBookmarks,
            Self::SearchBookmarks(_) => PlanAction::SearchBookmarks,
            Self::OrganizeBookmarks(_) => PlanAction::OrganizeBookmarks,
        }
    }
}

// ---------------------------------------------------------------------------
// Tab payloads
// ---------------------------------------------------------------------------

/// A tab as described by the planner. Only the title is used for matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabRef {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TabRef {
    /// The URL, treating an empty string as absent.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// One target group of an `organize_tabs` plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabGroupSpec {
    pub group_name: String,
    #[serde(default)]
    pub tabs: Vec<TabRef>,
}

impl TabGroupSpec {
    /// Whether this entry means "take these tabs out of their groups".
    pub fn is_ungrouped(&self) -> bool {
        self.group_name.trim().eq_ignore_ascii_case(UNGROUPED)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizeTabsOutput {
    #[serde(default)]
    pub tabs: Vec<TabGroupSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateTabsOutput {
    pub group_name: String,
    #[serde(default)]
    pub tabs: Vec<TabRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTabsOutput {
    pub title: String,
}

/// Tabs to close: either bare titles or `{title, url}` descriptors.
///
/// The shape is decided by the first element, the same way the planner's
/// output has always been read: a leading string means "titles", anything
/// else means "descriptors". Elements that do not fit the chosen shape are
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CloseTargets {
    Titles(Vec<String>),
    Tabs(Vec<TabRef>),
}

impl Default for CloseTargets {
    fn default() -> Self {
        Self::Titles(Vec::new())
    }
}

impl CloseTargets {
    /// The titles to match, whatever the shape.
    pub fn titles(&self) -> Vec<&str> {
        match self {
            Self::Titles(titles) => titles.iter().map(String::as_str).collect(),
            Self::Tabs(tabs) => tabs.iter().map(|t| t.title.as_str()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Titles(titles) => titles.is_empty(),
            Self::Tabs(tabs) => tabs.is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for CloseTargets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Value>::deserialize(deserializer)?;
        match items.first() {
            None => Ok(Self::default()),
            Some(Value::String(_)) => Ok(Self::Titles(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )),
            Some(_) => Ok(Self::Tabs(
                items
                    .into_iter()
                    .filter_map(|v| serde_json::from_value::<TabRef>(v).ok())
                    .collect(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloseTabsOutput {
    #[serde(default)]
    pub tabs: CloseTargets,
}

// ---------------------------------------------------------------------------
// Bookmark payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRef {
    pub id: BookmarkId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoveBookmarksOutput {
    #[serde(default)]
    pub bookmarks: Vec<BookmarkRef>,
}

/// A bookmark the planner picked as a search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchBookmarksOutput {
    #[serde(default)]
    pub bookmarks: Vec<BookmarkHit>,
}

/// A node of the desired bookmark hierarchy.
///
/// `id` refers to a live node; a folder without a live counterpart may be
/// created during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetNode {
    #[serde(default)]
    pub id: Option<BookmarkId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<TargetNode>,
}

impl TargetNode {
    /// The URL, treating an empty string as absent.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn is_folder(&self) -> bool {
        self.url().is_none()
    }
}

/// Save an open tab into a folder, identified by folder title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabToFolder {
    #[serde(default)]
    pub tab_title: String,
    #[serde(default)]
    pub tab_url: Option<String>,
    pub folder_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizeBookmarksOutput {
    #[serde(default, deserialize_with = "one_or_many")]
    pub reorganized_bookmarks: Vec<TargetNode>,
    #[serde(default)]
    pub tabs_to_add: Vec<TabToFolder>,
}

/// Accept either a single tree or a list of trees.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TargetNode>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Many(Vec<TargetNode>),
        One(TargetNode),
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        Some(Shape::Many(nodes)) => nodes,
        Some(Shape::One(node)) => vec![node],
        None => Vec::new(),
    })
}
