//! Identity resolution: mapping plan-referenced titles and URLs onto live
//! tabs and bookmark folders.
//!
//! Plans carry no browser handles, so titles are the correlation key. Tab
//! matching is exact (after normalization) first, then substring; when
//! several tabs qualify the most recently accessed one wins. That tie-break
//! is a heuristic: a short title can substring-match unrelated tabs that
//! share a prefix. [`TitleResolver::substring_fallback`] turns the fallback
//! off for callers that prefer misses over false positives.
//!
//! A miss is never an error; callers log it and skip the item.

use tabi_session::models::{BookmarkNode, Tab};
use url::Url;

/// Lowercase and collapse all whitespace runs to single spaces.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical form of a URL for equality checks (`https://a.org` and
/// `https://a.org/` compare equal). Unparseable input is only trimmed.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// The most recently accessed tab; the earliest candidate wins ties.
fn most_recent<'a>(candidates: impl IntoIterator<Item = &'a Tab>) -> Option<&'a Tab> {
    candidates.into_iter().fold(None, |best, tab| match best {
        Some(b) if b.last_accessed >= tab.last_accessed => Some(b),
        _ => Some(tab),
    })
}

/// Title matching policy for tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleResolver {
    /// Fall back to substring containment when nothing matches exactly.
    pub substring_fallback: bool,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self {
            substring_fallback: true,
        }
    }
}

impl TitleResolver {
    pub fn new(substring_fallback: bool) -> Self {
        Self { substring_fallback }
    }

    /// Resolve a title to a single tab: exact, then substring, then the most
    /// recently accessed among the candidates.
    pub fn resolve<'a>(&self, tabs: &'a [Tab], title: &str) -> Option<&'a Tab> {
        let target = normalize_title(title);
        if target.is_empty() {
            return None;
        }

        let exact = most_recent(tabs.iter().filter(|t| normalize_title(&t.title) == target));
        if exact.is_some() || !self.substring_fallback {
            return exact;
        }
        most_recent(
            tabs.iter()
                .filter(|t| normalize_title(&t.title).contains(&target)),
        )
    }

    /// Resolve a title to every tab it names: all exact matches, or if there
    /// are none, the single best substring match.
    ///
    /// Used where a plan lists tabs to act on; duplicated tabs with the same
    /// title are all included.
    pub fn resolve_all<'a>(&self, tabs: &'a [Tab], title: &str) -> Vec<&'a Tab> {
        let target = normalize_title(title);
        if target.is_empty() {
            return Vec::new();
        }

        let exact: Vec<&Tab> = tabs
            .iter()
            .filter(|t| normalize_title(&t.title) == target)
            .collect();
        if !exact.is_empty() || !self.substring_fallback {
            return exact;
        }
        most_recent(
            tabs.iter()
                .filter(|t| normalize_title(&t.title).contains(&target)),
        )
        .into_iter()
        .collect()
    }
}

/// Find an open tab showing `url`, preferring the most recently accessed.
pub fn find_tab_by_url<'a>(tabs: &'a [Tab], url: &str) -> Option<&'a Tab> {
    let target = normalize_url(url);
    most_recent(tabs.iter().filter(|t| normalize_url(&t.url) == target))
}

/// Depth-first, pre-order search for the first folder titled `title`.
///
/// Tree order decides between folders that share a title.
pub fn find_folder<'a>(roots: &'a [BookmarkNode], title: &str) -> Option<&'a BookmarkNode> {
    let target = normalize_title(title);
    if target.is_empty() {
        return None;
    }

    let mut stack: Vec<&BookmarkNode> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.is_folder() && normalize_title(&node.title) == target {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}
