//! Snapshot diff service.
//!
//! # Responsibility
//! - Classify current alerts as new, updated or unchanged against the
//!   snapshot recorded by the previous run.
//! - Persist the current run's snapshot through the repository, either
//!   together with the diff or as a separate commit step.
//!
//! # Invariants
//! - Classification compares raw header and period text only; normalized
//!   periods are recomputed every run and never persisted.
//! - Statuses follow current feed order; duplicate ids keep the first entry.

use crate::model::alert::RawAlert;
use crate::repo::snapshot_repo::{RepoResult, SnapshotEntry, SnapshotMap, SnapshotRepository};
use log::info;
use serde::Serialize;
use std::collections::HashSet;

/// Change classification of one alert between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChange {
    New,
    Updated,
    Unchanged,
}

impl AlertChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Classification of one current alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertStatus {
    pub alert_id: String,
    pub change: AlertChange,
}

/// Result of comparing the current alerts with the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    pub statuses: Vec<AlertStatus>,
    /// Ids present in the previous snapshot only, sorted.
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    pub fn change_for(&self, alert_id: &str) -> Option<AlertChange> {
        self.statuses
            .iter()
            .find(|status| status.alert_id == alert_id)
            .map(|status| status.change)
    }

    pub fn count(&self, change: AlertChange) -> usize {
        self.statuses
            .iter()
            .filter(|status| status.change == change)
            .count()
    }

    /// Returns whether anything differs from the previous run.
    pub fn has_changes(&self) -> bool {
        !self.removed.is_empty()
            || self
                .statuses
                .iter()
                .any(|status| status.change != AlertChange::Unchanged)
    }
}

/// Builds the snapshot map recorded for `alerts`.
pub fn snapshot_of(alerts: &[RawAlert]) -> SnapshotMap {
    let mut map = SnapshotMap::new();
    for alert in alerts {
        map.entry(alert.id.clone()).or_insert_with(|| SnapshotEntry {
            header: alert.header_text.clone(),
            period: alert.raw_active_period.clone(),
        });
    }
    map
}

/// Compares current alerts against the previous snapshot.
pub fn diff_snapshots(previous: &SnapshotMap, current: &[RawAlert]) -> SnapshotDiff {
    let current_map = snapshot_of(current);
    let mut seen = HashSet::new();
    let mut statuses = Vec::with_capacity(current_map.len());

    for alert in current {
        if !seen.insert(alert.id.as_str()) {
            continue;
        }
        let Some(entry) = current_map.get(&alert.id) else {
            continue;
        };
        let change = match previous.get(&alert.id) {
            None => AlertChange::New,
            Some(before) if before == entry => AlertChange::Unchanged,
            Some(_) => AlertChange::Updated,
        };
        statuses.push(AlertStatus {
            alert_id: alert.id.clone(),
            change,
        });
    }

    let removed = previous
        .keys()
        .filter(|alert_id| !current_map.contains_key(*alert_id))
        .cloned()
        .collect();

    SnapshotDiff { statuses, removed }
}

/// Use-case service wrapping snapshot persistence.
pub struct SnapshotService<R: SnapshotRepository> {
    repo: R,
}

impl<R: SnapshotRepository> SnapshotService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the snapshot recorded by the previous run.
    pub fn previous(&self) -> RepoResult<SnapshotMap> {
        self.repo.load_all()
    }

    /// Diffs `alerts` against the stored snapshot, then stores them.
    pub fn record_run(&self, alerts: &[RawAlert]) -> RepoResult<SnapshotDiff> {
        let diff = self.preview_run(alerts)?;
        self.commit_run(alerts)?;
        Ok(diff)
    }

    /// Classifies `alerts` without persisting anything.
    pub fn preview_run(&self, alerts: &[RawAlert]) -> RepoResult<SnapshotDiff> {
        let diff = diff_snapshots(&self.repo.load_all()?, alerts);
        info!(
            "event=snapshot_diff module=service status=ok new={} updated={} unchanged={} removed={}",
            diff.count(AlertChange::New),
            diff.count(AlertChange::Updated),
            diff.count(AlertChange::Unchanged),
            diff.removed.len()
        );
        Ok(diff)
    }

    /// Stores `alerts` as the snapshot the next run compares against.
    ///
    /// Callers that publish output derived from a preview should commit only
    /// after publishing succeeds.
    pub fn commit_run(&self, alerts: &[RawAlert]) -> RepoResult<()> {
        let snapshot = snapshot_of(alerts);
        self.repo.replace_all(&snapshot)?;
        info!(
            "event=snapshot_commit module=service status=ok alerts={}",
            snapshot.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{diff_snapshots, snapshot_of, AlertChange};
    use crate::model::alert::RawAlert;

    #[test]
    fn diff_classifies_new_updated_unchanged_and_removed() {
        let before = snapshot_of(&[
            RawAlert::new("same").with_header("h").with_active_period("p"),
            RawAlert::new("edited").with_header("h").with_active_period("old"),
            RawAlert::new("gone").with_header("h"),
        ]);
        let current = vec![
            RawAlert::new("fresh").with_header("h"),
            RawAlert::new("same").with_header("h").with_active_period("p"),
            RawAlert::new("edited").with_header("h").with_active_period("new"),
        ];

        let diff = diff_snapshots(&before, &current);
        assert_eq!(diff.change_for("fresh"), Some(AlertChange::New));
        assert_eq!(diff.change_for("same"), Some(AlertChange::Unchanged));
        assert_eq!(diff.change_for("edited"), Some(AlertChange::Updated));
        assert_eq!(diff.removed, vec!["gone".to_string()]);
        assert!(diff.has_changes());
        let order: Vec<&str> = diff.statuses.iter().map(|s| s.alert_id.as_str()).collect();
        assert_eq!(order, vec!["fresh", "same", "edited"]);
    }

    #[test]
    fn identical_runs_have_no_changes() {
        let alerts = vec![RawAlert::new("a").with_header("h").with_active_period("p")];
        let diff = diff_snapshots(&snapshot_of(&alerts), &alerts);
        assert!(!diff.has_changes());
        assert_eq!(diff.count(AlertChange::Unchanged), 1);
    }

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let alerts = vec![
            RawAlert::new("a").with_header("first"),
            RawAlert::new("a").with_header("second"),
        ];
        let diff = diff_snapshots(&snapshot_of(&alerts[..1]), &alerts);
        assert_eq!(diff.statuses.len(), 1);
        assert_eq!(diff.change_for("a"), Some(AlertChange::Unchanged));
    }
}
