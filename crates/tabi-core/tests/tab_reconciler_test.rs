//! Integration tests for the tab reconciler against an in-memory session.

use tabi_core::color::group_color;
use tabi_core::plan::{CloseTargets, TabGroupSpec, TabRef};
use tabi_core::reconcile::{ItemOutcome, TabReconciler};
use tabi_core::resolve::TitleResolver;
use tabi_core::snapshot::focused_window;
use tabi_session::models::{GroupId, NewTab, TabId, WindowId};
use tabi_test_utils::{Failure, RecordingSession, SessionCall, SessionStateBuilder};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn tab_ref(title: &str) -> TabRef {
    TabRef {
        title: title.to_string(),
        url: None,
        description: None,
    }
}

fn url_ref(url: &str) -> TabRef {
    TabRef {
        title: String::new(),
        url: Some(url.to_string()),
        description: None,
    }
}

fn spec(name: &str, titles: &[&str]) -> TabGroupSpec {
    TabGroupSpec {
        group_name: name.to_string(),
        tabs: titles.iter().map(|t| tab_ref(t)).collect(),
    }
}

fn dev_session() -> RecordingSession {
    RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "GitHub - tabi", "https://github.com/tabi")
            .tab(2, 1, "Stack Overflow - lifetimes", "https://stackoverflow.com/q/1")
            .tab(3, 1, "YouTube", "https://youtube.com")
            .build(),
    )
}

// -----------------------------------------------------------------------
// organize_tabs
// -----------------------------------------------------------------------

#[tokio::test]
async fn organize_into_new_group() {
    let session = dev_session();
    let window = focused_window(&session).await.unwrap();
    let reconciler = TabReconciler::new(&session, TitleResolver::default());

    let report = reconciler
        .organize_tabs(
            &window,
            &[spec("Dev", &["GitHub - tabi", "Stack Overflow - lifetimes"])],
        )
        .await
        .unwrap();
    assert_eq!(report.applied_count(), 1);

    let state = session.state();
    assert_eq!(state.groups.len(), 1);
    let group = &state.groups[0];
    assert_eq!(group.title.as_deref(), Some("Dev"));
    assert_eq!(group.color, group_color("Dev"));
    assert!(group.collapsed);

    let grouped: Vec<_> = state
        .tabs
        .iter()
        .filter(|t| t.group_id == Some(group.id))
        .map(|t| t.id)
        .collect();
    assert_eq!(grouped, vec![TabId(1), TabId(2)]);
    assert_eq!(state.tabs[2].group_id, None);
}

#[tokio::test]
async fn organize_reuses_group_with_same_title() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .group(5, 1, "dev")
            .grouped_tab(1, 1, "GitHub", "https://github.com", 5)
            .tab(2, 1, "crates.io", "https://crates.io")
            .build(),
    );
    let window = focused_window(&session).await.unwrap();
    TabReconciler::new(&session, TitleResolver::default())
        .organize_tabs(&window, &[spec("Dev", &["crates.io"])])
        .await
        .unwrap();

    assert!(session.calls().contains(&SessionCall::GroupTabs {
        tab_ids: vec![TabId(2)],
        group: Some(GroupId(5)),
        window_id: WindowId(1),
    }));
    let state = session.state();
    assert_eq!(state.groups.len(), 1);
    assert_eq!(state.groups[0].title.as_deref(), Some("Dev"));
    assert!(state.tabs.iter().all(|t| t.group_id == Some(GroupId(5))));
}

#[tokio::test]
async fn ungrouped_never_creates_a_group() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .group(5, 1, "Old")
            .grouped_tab(1, 1, "Notes", "https://notes.example", 5)
            .tab(2, 1, "Mail", "https://mail.example")
            .build(),
    );
    let window = focused_window(&session).await.unwrap();
    let report = TabReconciler::new(&session, TitleResolver::default())
        .organize_tabs(&window, &[spec("Ungrouped", &["Notes", "Mail"])])
        .await
        .unwrap();

    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.skipped_count(), 1);

    let calls = session.calls();
    assert_eq!(calls, vec![SessionCall::UngroupTab(TabId(1))]);

    let state = session.state();
    assert!(state.groups.is_empty());
    assert!(state.tabs.iter().all(|t| t.group_id.is_none()));
}

#[tokio::test]
async fn unmatched_titles_are_skipped_and_others_still_grouped() {
    let session = dev_session();
    let window = focused_window(&session).await.unwrap();
    let report = TabReconciler::new(&session, TitleResolver::default())
        .organize_tabs(
            &window,
            &[
                spec("Ghosts", &["Does Not Exist"]),
                spec("Video", &["YouTube", "Vimeo"]),
            ],
        )
        .await
        .unwrap();

    // "Does Not Exist", the empty "Ghosts" group, and "Vimeo".
    assert_eq!(report.skipped_count(), 3);
    assert_eq!(report.applied_count(), 1);

    let state = session.state();
    assert_eq!(state.groups.len(), 1);
    assert_eq!(state.groups[0].title.as_deref(), Some("Video"));
}

#[tokio::test]
async fn ungroup_failure_does_not_stop_the_batch() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .group(5, 1, "Work")
            .grouped_tab(1, 1, "Jira", "https://jira.example", 5)
            .grouped_tab(2, 1, "Confluence", "https://wiki.example", 5)
            .build(),
    )
    .fail_on(Failure::UngroupTab(TabId(1)));
    let window = focused_window(&session).await.unwrap();

    let report = TabReconciler::new(&session, TitleResolver::default())
        .organize_tabs(&window, &[spec("Ungrouped", &["Jira", "Confluence"])])
        .await
        .unwrap();

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.applied_count(), 1);
    assert!(matches!(
        report.items[0].outcome,
        ItemOutcome::Failed { .. }
    ));

    let state = session.state();
    assert_eq!(state.tabs[0].group_id, Some(GroupId(5)));
    assert_eq!(state.tabs[1].group_id, None);
}

// -----------------------------------------------------------------------
// generate_tabs
// -----------------------------------------------------------------------

#[tokio::test]
async fn generate_opens_inactive_tabs_and_groups_them() {
    let session = RecordingSession::new(SessionStateBuilder::new().window(1, true).build());
    let window = focused_window(&session).await.unwrap();

    let report = TabReconciler::new(&session, TitleResolver::default())
        .generate_tabs(
            &window,
            "Reading",
            &[
                url_ref("https://doc.rust-lang.org/book"),
                tab_ref("no url here"),
                url_ref("https://rust-lang.github.io/async-book"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(report.applied_count(), 2);

    let created: Vec<_> = session
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            SessionCall::CreateTab(tab) => Some(tab),
            _ => None,
        })
        .collect();
    assert_eq!(
        created,
        vec![
            NewTab {
                url: "https://doc.rust-lang.org/book".into(),
                active: false,
                window_id: Some(WindowId(1)),
            },
            NewTab {
                url: "https://rust-lang.github.io/async-book".into(),
                active: false,
                window_id: Some(WindowId(1)),
            },
        ]
    );

    let state = session.state();
    assert_eq!(state.groups.len(), 1);
    assert_eq!(state.groups[0].title.as_deref(), Some("Reading"));
    assert_eq!(state.groups[0].color, group_color("Reading"));
    assert!(state.tabs.iter().all(|t| t.group_id == Some(state.groups[0].id)));
}

#[tokio::test]
async fn generate_groups_whatever_was_created() {
    let session = RecordingSession::new(SessionStateBuilder::new().window(1, true).build())
        .fail_on(Failure::CreateTab {
            url: "https://bad.example".into(),
        });
    let window = focused_window(&session).await.unwrap();

    let report = TabReconciler::new(&session, TitleResolver::default())
        .generate_tabs(
            &window,
            "Mixed",
            &[url_ref("https://bad.example"), url_ref("https://good.example")],
        )
        .await
        .unwrap();

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.applied_count(), 1);
    let state = session.state();
    assert_eq!(state.tabs.len(), 1);
    assert_eq!(state.tabs[0].url, "https://good.example");
    assert!(state.tabs[0].group_id.is_some());
}

// -----------------------------------------------------------------------
// search_tabs
// -----------------------------------------------------------------------

#[tokio::test]
async fn search_switches_to_tab_in_other_window() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .window(2, false)
            .popup(3, false)
            .tab(1, 1, "Docs", "https://docs.rs")
            .tab(2, 2, "Gmail - Inbox (3)", "https://mail.google.com")
            .tab(3, 3, "Gmail", "https://mail.google.com/popup")
            .build(),
    );

    let report = TabReconciler::new(&session, TitleResolver::default())
        .search_tabs("gmail")
        .await
        .unwrap();
    assert_eq!(report.applied_count(), 1);

    assert_eq!(
        session.calls(),
        vec![
            SessionCall::FocusWindow(WindowId(2)),
            SessionCall::ActivateTab(TabId(2)),
        ]
    );
    let state = session.state();
    assert!(state.windows.iter().find(|w| w.id == WindowId(2)).unwrap().focused);
    assert!(state.tabs[1].active);
}

#[tokio::test]
async fn search_prefers_most_recently_used_candidate() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "Rust docs - std", "https://doc.rust-lang.org/std")
            .tab(2, 1, "Rust docs - core", "https://doc.rust-lang.org/core")
            .accessed(1, 100)
            .accessed(2, 200)
            .build(),
    );
    TabReconciler::new(&session, TitleResolver::default())
        .search_tabs("rust docs")
        .await
        .unwrap();
    assert!(session.calls().contains(&SessionCall::ActivateTab(TabId(2))));
}

#[tokio::test]
async fn search_miss_touches_nothing() {
    let session = dev_session();
    let report = TabReconciler::new(&session, TitleResolver::default())
        .search_tabs("Hacker News")
        .await
        .unwrap();
    assert_eq!(report.applied_count(), 0);
    assert_eq!(report.skipped_count(), 1);
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn search_skips_window_closed_since_listing() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "Gmail", "https://mail.google.com")
            .build(),
    )
    .with_closed_window(9);

    let report = TabReconciler::new(&session, TitleResolver::default())
        .search_tabs("Gmail")
        .await
        .unwrap();

    assert_eq!(report.applied_count(), 1);
    assert_eq!(
        session.calls(),
        vec![
            SessionCall::FocusWindow(WindowId(1)),
            SessionCall::ActivateTab(TabId(1)),
        ]
    );
}

// -----------------------------------------------------------------------
// close_tabs
// -----------------------------------------------------------------------

#[tokio::test]
async fn close_twice_is_idempotent() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "Reddit", "https://reddit.com")
            .tab(2, 1, "Docs", "https://docs.rs")
            .build(),
    );
    let window = focused_window(&session).await.unwrap();
    let reconciler = TabReconciler::new(&session, TitleResolver::default());
    let targets = CloseTargets::Titles(vec!["Reddit".into()]);

    let first = reconciler.close_tabs(&window, &targets).await.unwrap();
    assert_eq!(first.applied_count(), 1);
    let after_first = session.state();
    assert_eq!(after_first.tabs.len(), 1);
    assert_eq!(after_first.tabs[0].title, "Docs");

    let second = reconciler.close_tabs(&window, &targets).await.unwrap();
    assert_eq!(second.applied_count(), 0);
    assert_eq!(second.failed_count(), 0);
    assert_eq!(session.state(), after_first);

    let removals = session
        .calls()
        .into_iter()
        .filter(|c| matches!(c, SessionCall::RemoveTabs(_)))
        .count();
    assert_eq!(removals, 1);
}

#[tokio::test]
async fn close_removes_all_matches_in_one_batch() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "YouTube", "https://youtube.com/1")
            .tab(2, 1, "Docs", "https://docs.rs")
            .tab(3, 1, "YouTube", "https://youtube.com/2")
            .tab(4, 1, "Twitter", "https://twitter.com")
            .build(),
    );
    let window = focused_window(&session).await.unwrap();
    let targets = CloseTargets::Tabs(vec![tab_ref("youtube"), tab_ref("Twitter")]);

    TabReconciler::new(&session, TitleResolver::default())
        .close_tabs(&window, &targets)
        .await
        .unwrap();

    assert_eq!(
        session.calls(),
        vec![SessionCall::RemoveTabs(vec![TabId(1), TabId(3), TabId(4)])]
    );
    assert_eq!(session.state().tabs.len(), 1);
}

#[tokio::test]
async fn rejected_batch_falls_back_to_single_closes() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "Reddit", "https://reddit.com")
            .tab(2, 1, "Twitter", "https://twitter.com")
            .build(),
    )
    .fail_on(Failure::RemoveTabs {
        containing: TabId(2),
    });
    let window = focused_window(&session).await.unwrap();

    let report = TabReconciler::new(&session, TitleResolver::default())
        .close_tabs(&window, &CloseTargets::Titles(vec!["Reddit".into(), "Twitter".into()]))
        .await
        .unwrap();

    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.failed_count(), 1);
    let state = session.state();
    assert_eq!(state.tabs.len(), 1);
    assert_eq!(state.tabs[0].id, TabId(2));
}

#[tokio::test]
async fn strict_resolver_does_not_close_partial_matches() {
    let session = RecordingSession::new(
        SessionStateBuilder::new()
            .window(1, true)
            .tab(1, 1, "CNN - Markets", "https://cnn.com/markets")
            .build(),
    );
    let window = focused_window(&session).await.unwrap();

    TabReconciler::new(&session, TitleResolver::new(false))
        .close_tabs(&window, &CloseTargets::Titles(vec!["CNN".into()]))
        .await
        .unwrap();

    assert!(session.calls().is_empty());
    assert_eq!(session.state().tabs.len(), 1);
}
