//! Tests that drive the `tabi` binary end to end.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

use tabi_session::SessionState;
use tabi_test_utils::{SessionStateBuilder, spawn_fake_planner};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

/// A `tabi` command isolated from the user's config and env.
fn tabi(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabi"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("TABI_PLANNER_URL")
        .env_remove("TABI_SESSION")
        .env("RUST_LOG", "warn");
    cmd
}

fn write_session(dir: &Path, state: &SessionState) -> PathBuf {
    let path = dir.join("session.json");
    std::fs::write(&path, serde_json::to_string_pretty(state).unwrap()).unwrap();
    path
}

fn read_session(path: &Path) -> SessionState {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn dev_session() -> SessionState {
    SessionStateBuilder::new()
        .window(1, true)
        .tab(1, 1, "GitHub", "https://github.com")
        .tab(2, 1, "Stack Overflow", "https://stackoverflow.com")
        .tab(3, 1, "Weather", "https://weather.example")
        .build()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// -----------------------------------------------------------------------
// color / init
// -----------------------------------------------------------------------

#[test]
fn color_prints_assigned_color() {
    let home = TempDir::new().unwrap();
    let output = tabi(home.path()).args(["color", "Dev"]).output().unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "purple");
}

#[test]
fn init_writes_config_and_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("tabi").join("config.toml");

    let output = tabi(home.path())
        .args(["init", "--planner-url", "http://planner:9000"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Config written to"));
    assert!(std::fs::read_to_string(&config).unwrap().contains("http://planner:9000"));

    let output = tabi(home.path()).arg("init").output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = tabi(home.path()).args(["init", "--force"]).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(std::fs::read_to_string(&config).unwrap().contains("http://127.0.0.1:8000"));
}

// -----------------------------------------------------------------------
// apply / snapshot
// -----------------------------------------------------------------------

#[test]
fn apply_organizes_tabs_in_session_file() {
    let home = TempDir::new().unwrap();
    let session = write_session(home.path(), &dev_session());
    let plan = home.path().join("plan.json");
    std::fs::write(
        &plan,
        json!({
            "action": "organize_tabs",
            "output": {"tabs": [
                {"group_name": "Dev", "tabs": [{"title": "GitHub"}, {"title": "Stack Overflow"}]}
            ]}
        })
        .to_string(),
    )
    .unwrap();

    let output = tabi(home.path())
        .arg("--session")
        .arg(&session)
        .arg("apply")
        .arg(&plan)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Tabs organized successfully!");

    let state = read_session(&session);
    assert_eq!(state.groups.len(), 1);
    let group = &state.groups[0];
    assert_eq!(group.title.as_deref(), Some("Dev"));
    assert!(group.collapsed);
    let grouped: Vec<i64> = state
        .tabs
        .iter()
        .filter(|t| t.group_id == Some(group.id))
        .map(|t| t.id.0)
        .collect();
    assert_eq!(grouped, vec![1, 2]);
}

#[test]
fn apply_unknown_action_exits_nonzero_and_leaves_tabs() {
    let home = TempDir::new().unwrap();
    let session = write_session(home.path(), &dev_session());
    let plan = home.path().join("plan.json");
    std::fs::write(&plan, r#"{"action": "delete_everything", "output": {}}"#).unwrap();

    let output = tabi(home.path())
        .arg("--session")
        .arg(&session)
        .arg("apply")
        .arg(&plan)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown action returned from agent."));
    assert_eq!(read_session(&session), dev_session());
}

#[test]
fn missing_session_file_mentions_flag() {
    let home = TempDir::new().unwrap();
    let output = tabi(home.path()).arg("snapshot").output().unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--session"));
}

#[test]
fn snapshot_groups_tabs_of_focused_window() {
    let home = TempDir::new().unwrap();
    let session = write_session(home.path(), &dev_session());

    let output = tabi(home.path())
        .arg("--session")
        .arg(&session)
        .arg("snapshot")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let context: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(context["tabs"][0]["group_name"], "Ungrouped");
    assert_eq!(context["tabs"][0]["tabs"].as_array().unwrap().len(), 3);
    assert!(context.get("bookmarks").is_none());
}

// -----------------------------------------------------------------------
// run
// -----------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn run_sends_prompt_and_applies_plan() {
    let server = spawn_fake_planner(
        200,
        json!({
            "action": "close_tabs",
            "output": {"tabs": [{"title": "Weather"}]}
        })
        .to_string(),
    )
    .await;
    let home = TempDir::new().unwrap();
    let session = write_session(home.path(), &dev_session());

    let mut cmd = tabi(home.path());
    cmd.arg("--planner-url")
        .arg(server.url())
        .arg("--session")
        .arg(&session)
        .args(["run", "close", "the", "weather", "tab"]);
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();

    assert!(output.status.success(), "{}", stderr(&output));
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["prompt"], "close the weather tab");

    let titles: Vec<String> = read_session(&session)
        .tabs
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["GitHub", "Stack Overflow"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_reports_backend_error() {
    let server = spawn_fake_planner(500, r#"{"detail": "boom"}"#).await;
    let home = TempDir::new().unwrap();
    let session = write_session(home.path(), &dev_session());

    let mut cmd = tabi(home.path());
    cmd.arg("--planner-url")
        .arg(server.url())
        .arg("--session")
        .arg(&session)
        .args(["run", "do", "something"]);
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Backend error"));
    assert_eq!(read_session(&session), dev_session());
}
