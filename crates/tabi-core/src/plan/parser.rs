//! Planner response parser.
//!
//! Turns a [`RawPlan`] envelope into a typed [`Plan`]. Validation stops at
//! the shape needed to act: the action must be known and the payload must
//! deserialize into that action's output type. Contents are not checked.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::types::{Plan, PlanAction, RawPlan};

/// Errors that can occur while reading a planner response.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("plan is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported action {0:?}")]
    UnsupportedAction(String),

    #[error("malformed output for {action}: {source}")]
    MalformedOutput {
        action: PlanAction,
        source: serde_json::Error,
    },
}

/// Parse a planner response body.
pub fn parse_plan_json(content: &str) -> Result<Plan, PlanParseError> {
    let raw: RawPlan = serde_json::from_str(content)?;
    parse_plan(&raw)
}

/// Shape-check a raw plan against its action.
pub fn parse_plan(raw: &RawPlan) -> Result<Plan, PlanParseError> {
    let action: PlanAction = raw
        .action
        .trim()
        .parse()
        .map_err(|_| PlanParseError::UnsupportedAction(raw.action.clone()))?;

    let plan = match action {
        PlanAction::OrganizeTabs => Plan::OrganizeTabs(output(action, &raw.output)?),
        PlanAction::GenerateTabs => Plan::GenerateTabs(output(action, &raw.output)?),
        PlanAction::SearchTabs => Plan::SearchTabs(output(action, &raw.output)?),
        PlanAction::CloseTabs => Plan::CloseTabs(output(action, &raw.output)?),
        PlanAction::RemoveBookmarks => Plan::RemoveBookmarks(output(action, &raw.output)?),
        PlanAction::SearchBookmarks => Plan::SearchBookmarks(output(action, &raw.output)?),
        PlanAction::OrganizeBookmarks => Plan::OrganizeBookmarks(output(action, &raw.output)?),
    };
    Ok(plan)
}

/// Deserialize an action payload. A missing payload reads as `{}` so that
/// actions whose fields all have defaults still parse.
fn output<T: DeserializeOwned>(action: PlanAction, value: &Value) -> Result<T, PlanParseError> {
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|source| PlanParseError::MalformedOutput { action, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::types::CloseTargets;

    #[test]
    fn parse_organize_tabs() {
        let plan = parse_plan_json(
            r#"{"action": "organize_tabs", "output": {"tabs": [
                {"group_name": "Dev", "tabs": [{"title": "GitHub - foo", "url": "https://github.com/foo"}]}
            ]}}"#,
        )
        .expect("should parse");
        match plan {
            Plan::OrganizeTabs(out) => {
                assert_eq!(out.tabs.len(), 1);
                assert_eq!(out.tabs[0].group_name, "Dev");
                assert_eq!(out.tabs[0].tabs[0].title, "GitHub - foo");
            }
            other => panic!("expected OrganizeTabs, got {other:?}"),
        }
    }

    #[test]
    fn parse_close_tabs_titles() {
        let plan = parse_plan_json(r#"{"action": "close_tabs", "output": {"tabs": ["Reddit"]}}"#)
            .unwrap();
        assert_eq!(plan.action(), PlanAction::CloseTabs);
        match plan {
            Plan::CloseTabs(out) => {
                assert_eq!(out.tabs, CloseTargets::Titles(vec!["Reddit".into()]))
            }
            other => panic!("expected CloseTabs, got {other:?}"),
        }
    }

    #[test]
    fn missing_output_defaults_when_possible() {
        let plan = parse_plan_json(r#"{"action": "organize_tabs"}"#).unwrap();
        assert_eq!(plan, Plan::OrganizeTabs(Default::default()));
    }

    #[test]
    fn rejects_unknown_action() {
        let err = parse_plan_json(r#"{"action": "open_portal", "output": {}}"#).unwrap_err();
        assert!(
            matches!(err, PlanParseError::UnsupportedAction(ref a) if a == "open_portal"),
            "expected UnsupportedAction, got: {err}"
        );
    }

    #[test]
    fn rejects_output_of_wrong_shape() {
        let err = parse_plan_json(r#"{"action": "search_tabs", "output": {"query": "x"}}"#)
            .unwrap_err();
        assert!(
            matches!(
                err,
                PlanParseError::MalformedOutput {
                    action: PlanAction::SearchTabs,
                    ..
                }
            ),
            "expected MalformedOutput, got: {err}"
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_plan_json("this is not json {{{").unwrap_err();
        assert!(matches!(err, PlanParseError::Json(_)), "expected Json, got: {err}");
    }

    #[test]
    fn action_name_is_trimmed() {
        let plan = parse_plan_json(r#"{"action": " search_tabs ", "output": {"title": "Docs"}}"#)
            .unwrap();
        assert_eq!(plan.action(), PlanAction::SearchTabs);
    }
}
