//! Tab reconciler: organize, generate, search/switch and close.

use std::collections::HashSet;

use tabi_session::BrowserSession;
use tabi_session::models::{GroupId, GroupUpdate, NewTab, Tab, TabId, Window};

use crate::color::group_color;
use crate::error::EngineError;
use crate::plan::{CloseTargets, TabGroupSpec, TabRef};
use crate::reconcile::{ReconcileReport, normal_window_tabs};
use crate::resolve::{TitleResolver, normalize_title};

/// Applies tab-oriented plans to a session. Holds no state between calls.
pub struct TabReconciler<'a> {
    session: &'a dyn BrowserSession,
    resolver: TitleResolver,
}

impl<'a> TabReconciler<'a> {
    pub fn new(session: &'a dyn BrowserSession, resolver: TitleResolver) -> Self {
        Self { session, resolver }
    }

    /// Move tabs into the groups the plan names.
    ///
    /// A group named `"Ungrouped"` takes its tabs out of whatever group they
    /// are in and is never created as a browser group. Any other name reuses
    /// the window's group with that title or creates one, then sets its
    /// title, derived color and collapsed state.
    pub async fn organize_tabs(
        &self,
        window: &Window,
        groups: &[TabGroupSpec],
    ) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();

        for spec in groups {
            // Re-read per group: earlier groups in the plan may have moved
            // tabs or dissolved groups.
            let live = match self.session.tabs(window.id).await {
                Ok(tabs) => tabs,
                Err(e) => {
                    report.failed(&spec.group_name, e);
                    continue;
                }
            };
            let matched = self.match_entries(&live, &spec.tabs, &mut report);

            if spec.is_ungrouped() {
                self.ungroup(&matched, &mut report).await;
                continue;
            }

            if matched.is_empty() {
                report.skipped(&spec.group_name, "no open tab matches this group");
                continue;
            }

            let existing = match self.existing_group(window, &spec.group_name).await {
                Ok(id) => id,
                Err(e) => {
                    report.failed(&spec.group_name, e);
                    continue;
                }
            };
            let ids: Vec<TabId> = matched.iter().map(|t| t.id).collect();
            match self
                .group_and_style(&ids, existing, window, &spec.group_name)
                .await
            {
                Ok(group_id) => {
                    tracing::info!(
                        group = %spec.group_name,
                        group_id = %group_id,
                        tabs = ids.len(),
                        reused = existing.is_some(),
                        "organized tabs into group"
                    );
                    report.applied(&spec.group_name);
                }
                Err(e) => report.failed(&spec.group_name, e),
            }
        }

        Ok(report)
    }

    /// Open every described tab that has a URL (inactive), then group the
    /// new tabs under `group_name`. Descriptors without a URL are ignored.
    pub async fn generate_tabs(
        &self,
        window: &Window,
        group_name: &str,
        tabs: &[TabRef],
    ) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();
        let mut created = Vec::new();

        for entry in tabs {
            let Some(url) = entry.url() else {
                tracing::debug!(title = %entry.title, "generated tab has no URL; ignoring");
                continue;
            };
            let new_tab = NewTab {
                url: url.to_string(),
                active: false,
                window_id: Some(window.id),
            };
            match self.session.create_tab(new_tab).await {
                Ok(tab) => {
                    tracing::info!(tab_id = %tab.id, url = %url, "opened generated tab");
                    created.push(tab.id);
                    report.applied(url);
                }
                Err(e) => report.failed(url, e),
            }
        }

        if created.is_empty() {
            return Ok(report);
        }

        if let Err(e) = self
            .group_and_style(&created, None, window, group_name)
            .await
        {
            report.failed(group_name, e);
        }
        Ok(report)
    }

    /// Find a tab by title across every normal window, then focus its window
    /// and activate it.
    pub async fn search_tabs(&self, title: &str) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();
        let tabs = normal_window_tabs(self.session).await?;

        let Some(target) = self.resolver.resolve(&tabs, title) else {
            report.skipped(title, "no open tab matches");
            return Ok(report);
        };

        let switched = async {
            self.session.focus_window(target.window_id).await?;
            self.session.activate_tab(target.id).await
        };
        match switched.await {
            Ok(()) => {
                tracing::info!(tab_id = %target.id, title = %target.title, "switched to tab");
                report.applied(&target.title);
            }
            Err(e) => report.failed(&target.title, e),
        }
        Ok(report)
    }

    /// Close the tabs the plan names in the focused window, in one batch.
    ///
    /// No match is not an error. If the batch is rejected (typically because
    /// a tab went away after it was read) each tab is retried on its own so
    /// the rest still close.
    pub async fn close_tabs(
        &self,
        window: &Window,
        targets: &CloseTargets,
    ) -> Result<ReconcileReport, EngineError> {
        let mut report = ReconcileReport::new();
        let live = self.session.tabs(window.id).await?;

        let mut seen = HashSet::new();
        let mut doomed: Vec<&Tab> = Vec::new();
        for title in targets.titles() {
            let hits = self.resolver.resolve_all(&live, title);
            if hits.is_empty() {
                report.skipped(title, "no open tab matches");
            }
            doomed.extend(hits.into_iter().filter(|t| seen.insert(t.id)));
        }

        if doomed.is_empty() {
            tracing::warn!("no matching tabs found to close");
            return Ok(report);
        }

        let ids: Vec<TabId> = doomed.iter().map(|t| t.id).collect();
        match self.session.remove_tabs(&ids).await {
            Ok(()) => {
                tracing::info!(tabs = ?ids, "closed tabs");
                for tab in &doomed {
                    report.applied(&tab.title);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "batch close rejected; closing tabs one by one");
                for tab in &doomed {
                    match self.session.remove_tabs(&[tab.id]).await {
                        Ok(()) => report.applied(&tab.title),
                        Err(e) => report.failed(&tab.title, e),
                    }
                }
            }
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Resolve plan entries to live tabs, each tab at most once.
    fn match_entries<'t>(
        &self,
        live: &'t [Tab],
        entries: &[TabRef],
        report: &mut ReconcileReport,
    ) -> Vec<&'t Tab> {
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for entry in entries {
            let hits = self.resolver.resolve_all(live, &entry.title);
            if hits.is_empty() {
                report.skipped(&entry.title, "no open tab matches");
            }
            matched.extend(hits.into_iter().filter(|t| seen.insert(t.id)));
        }
        matched
    }

    async fn ungroup(&self, tabs: &[&Tab], report: &mut ReconcileReport) {
        for tab in tabs {
            if tab.group_id.is_none() {
                report.skipped(&tab.title, "already ungrouped");
                continue;
            }
            match self.session.ungroup_tab(tab.id).await {
                Ok(()) => {
                    tracing::info!(tab_id = %tab.id, title = %tab.title, "ungrouped tab");
                    report.applied(&tab.title);
                }
                Err(e) => report.failed(&tab.title, e),
            }
        }
    }

    /// The window's group titled `name`, if one exists.
    async fn existing_group(
        &self,
        window: &Window,
        name: &str,
    ) -> Result<Option<GroupId>, tabi_session::SessionError> {
        let wanted = normalize_title(name);
        let groups = self.session.tab_groups(window.id).await?;
        Ok(groups
            .into_iter()
            .find(|g| g.title.as_deref().map(normalize_title).as_deref() == Some(wanted.as_str()))
            .map(|g| g.id))
    }

    async fn group_and_style(
        &self,
        ids: &[TabId],
        existing: Option<GroupId>,
        window: &Window,
        name: &str,
    ) -> Result<GroupId, tabi_session::SessionError> {
        let group_id = self.session.group_tabs(ids, existing, window.id).await?;
        self.session
            .update_group(
                group_id,
                GroupUpdate {
                    title: Some(name.to_string()),
                    color: Some(group_color(name)),
                    collapsed: Some(true),
                },
            )
            .await?;
        Ok(group_id)
    }
}
