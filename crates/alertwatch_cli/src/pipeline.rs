//! The `run` command: feed → select → normalize → diff → render.
//!
//! The snapshot is committed only after the page is in place, so a failed
//! write leaves the next run's badges intact.

use crate::{fetch, strategy_registry};
use alertwatch_core::db::open_db;
use alertwatch_core::{
    decode_feed, render_page, AlertService, AlertSelector, MonitorConfig, PageContext, RawAlert,
    SnapshotService, SqliteSnapshotRepository,
};
use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn run(
    config: &MonitorConfig,
    assumed_year: i32,
    feed_file: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    info!(
        "event=run module=cli status=start assumed_year={} strategy={} dry_run={}",
        assumed_year, config.strategy, dry_run
    );

    let body = fetch::load_feed(config, feed_file)?;
    let alerts = decode_feed(&body)?;
    let selected = AlertSelector::new(config.selection_criteria()).select(alerts);

    let registry = strategy_registry(config)?;
    let report = AlertService::from_registry(&registry)?.consolidate(&selected, assumed_year)?;

    let conn = open_db(&config.state_db_path).with_context(|| {
        format!(
            "failed to open state database `{}`",
            config.state_db_path.display()
        )
    })?;
    let snapshots = SnapshotService::new(SqliteSnapshotRepository::new(&conn));
    let current: Vec<RawAlert> = selected.into_iter().map(|s| s.alert).collect();
    let diff = snapshots.preview_run(&current)?;

    let context = PageContext {
        title: config.page_title.clone(),
        generated_at: chrono::Local::now().naive_local(),
        diff,
    };
    let html = render_page(&report.alerts, &context);
    write_page(&config.output_path, &html)?;

    if !dry_run {
        snapshots.commit_run(&current)?;
    }

    info!(
        "event=run module=cli status=ok groups={} changed={} output={}",
        report.alerts.len(),
        context.diff.has_changes(),
        config.output_path.display()
    );
    println!(
        "{} alert group(s) written to {}",
        report.alerts.len(),
        config.output_path.display()
    );
    Ok(())
}

/// Writes `html` next to `path` and renames it into place.
fn write_page(path: &Path, html: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let context = || format!("failed to write page to `{}`", path.display());

    let mut file = NamedTempFile::new_in(dir).with_context(context)?;
    file.write_all(html.as_bytes()).with_context(context)?;
    file.persist(path)
        .map_err(|err| err.error)
        .with_context(context)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use alertwatch_core::db::open_db;
    use alertwatch_core::{MonitorConfig, SnapshotService, SqliteSnapshotRepository};
    use std::path::Path;

    const FEED: &str = r#"{"entity": [{
        "id": "lmm:planned_work:1",
        "alert": {
            "header_text": {"translation": [
                {"text": "No [7] trains between 34 St-Hudson Yards and Queensboro Plaza", "language": "en"}
            ]},
            "transit_realtime.mercury_alert": {
                "human_readable_active_period": {"translation": [
                    {"text": "Feb 25 and Mar 4, Tuesdays, 12:45 AM to 5:00 AM", "language": "en"}
                ]}
            }
        }
    }]}"#;

    fn stored_ids(db_path: &Path) -> Vec<String> {
        let conn = open_db(db_path).unwrap();
        let service = SnapshotService::new(SqliteSnapshotRepository::new(&conn));
        service.previous().unwrap().into_keys().collect()
    }

    #[test]
    fn failed_page_write_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let feed_path = dir.path().join("feed.json");
        std::fs::write(&feed_path, FEED).unwrap();

        let mut config = MonitorConfig {
            state_db_path: dir.path().join("state.sqlite3"),
            output_path: dir.path().join("missing").join("index.html"),
            ..MonitorConfig::default()
        };

        assert!(run(&config, 2025, Some(&feed_path), false).is_err());
        assert!(stored_ids(&config.state_db_path).is_empty());

        config.output_path = dir.path().join("index.html");
        run(&config, 2025, Some(&feed_path), false).unwrap();
        let html = std::fs::read_to_string(&config.output_path).unwrap();
        assert!(html.contains("lmm:planned_work:1"));
        assert_eq!(
            stored_ids(&config.state_db_path),
            vec!["lmm:planned_work:1".to_string()]
        );
    }

    #[test]
    fn dry_run_writes_page_without_committing() {
        let dir = tempfile::tempdir().unwrap();
        let feed_path = dir.path().join("feed.json");
        std::fs::write(&feed_path, FEED).unwrap();

        let config = MonitorConfig {
            state_db_path: dir.path().join("state.sqlite3"),
            output_path: dir.path().join("index.html"),
            ..MonitorConfig::default()
        };

        run(&config, 2025, Some(&feed_path), true).unwrap();
        assert!(config.output_path.exists());
        assert!(stored_ids(&config.state_db_path).is_empty());
    }
}
