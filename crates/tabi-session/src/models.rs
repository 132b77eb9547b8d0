use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque browser handle for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

/// Opaque browser handle for a tab group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

/// Opaque browser handle for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i64);

/// Opaque browser handle for a bookmark node. Browsers hand these out as
/// strings, so they are kept as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(pub String);

impl BookmarkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Tab group color as understood by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Grey => "grey",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
            Self::Orange => "orange",
        };
        f.write_str(s)
    }
}

impl FromStr for GroupColor {
    type Err = GroupColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grey" => Ok(Self::Grey),
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            "yellow" => Ok(Self::Yellow),
            "green" => Ok(Self::Green),
            "pink" => Ok(Self::Pink),
            "purple" => Ok(Self::Purple),
            "cyan" => Ok(Self::Cyan),
            "orange" => Ok(Self::Orange),
            other => Err(GroupColorParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`GroupColor`] string.
#[derive(Debug, Clone)]
pub struct GroupColorParseError(pub String);

impl fmt::Display for GroupColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid group color: {:?}", self.0)
    }
}

impl std::error::Error for GroupColorParseError {}

// ---------------------------------------------------------------------------

/// Kind of browser window. Only `normal` windows hold user tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Normal,
    Popup,
    App,
    Devtools,
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Popup => "popup",
            Self::App => "app",
            Self::Devtools => "devtools",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A browser window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub kind: WindowKind,
}

/// An open tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub window_id: WindowId,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
}

/// A tab group. Lives only as long as it holds at least one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabGroup {
    pub id: GroupId,
    #[serde(default)]
    pub title: Option<String>,
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
    pub window_id: WindowId,
}

/// A node of the bookmark tree. A node is a bookmark iff `url` is present;
/// folders never carry a URL and bookmarks never carry children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub id: BookmarkId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    /// Build an empty folder.
    pub fn folder(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: BookmarkId::new(id),
            title: title.into(),
            url: None,
            children: Vec::new(),
        }
    }

    /// Build a bookmark leaf.
    pub fn bookmark(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: BookmarkId::new(id),
            title: title.into(),
            url: Some(url.into()),
            children: Vec::new(),
        }
    }

    /// Attach children (builder-style). Only meaningful for folders.
    pub fn with_children(mut self, children: Vec<BookmarkNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    /// Depth-first pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a BookmarkNode, Option<&'a BookmarkId>)) {
        fn go<'a>(
            node: &'a BookmarkNode,
            parent: Option<&'a BookmarkId>,
            visit: &mut impl FnMut(&'a BookmarkNode, Option<&'a BookmarkId>),
        ) {
            visit(node, parent);
            for child in &node.children {
                go(child, Some(&node.id), visit);
            }
        }
        go(self, None, visit);
    }

    /// Whether `id` is this node or one of its descendants.
    pub fn contains(&self, id: &BookmarkId) -> bool {
        self.id == *id || self.children.iter().any(|c| c.contains(id))
    }
}

// ---------------------------------------------------------------------------
// Mutation requests
// ---------------------------------------------------------------------------

/// Properties for opening a new tab.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTab {
    pub url: String,
    pub active: bool,
    /// Target window; the focused normal window when `None`.
    pub window_id: Option<WindowId>,
}

/// Properties to change on an existing group. `None` fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUpdate {
    pub title: Option<String>,
    pub color: Option<GroupColor>,
    pub collapsed: Option<bool>,
}

/// Properties for creating a bookmark or (with `url == None`) a folder.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBookmark {
    pub parent_id: BookmarkId,
    pub title: String,
    pub url: Option<String>,
}
