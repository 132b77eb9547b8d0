//! Plan handling: planner response types and parsing.

pub mod parser;
pub mod types;

pub use parser::{PlanParseError, parse_plan, parse_plan_json};
pub use types::{
    BookmarkHit, BookmarkRef, CloseTabsOutput, CloseTargets, GenerateTabsOutput,
    OrganizeBookmarksOutput, OrganizeTabsOutput, Plan, PlanAction, RawPlan,
    RemoveBookmarksOutput, SearchBookmarksOutput, SearchTabsOutput, TabGroupSpec, TabRef,
    TabToFolder, TargetNode, UNGROUPED,
};
