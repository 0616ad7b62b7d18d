//! Feed retrieval over HTTP or from a saved file.

use alertwatch_core::MonitorConfig;
use anyhow::{bail, Context, Result};
use log::{error, info};
use std::path::Path;
use std::time::{Duration, Instant};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("alertwatch/", env!("CARGO_PKG_VERSION"));

/// Returns the feed body from `feed_file` when given, else from `feed_url`.
pub fn load_feed(config: &MonitorConfig, feed_file: Option<&Path>) -> Result<String> {
    match feed_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feed file `{}`", path.display())),
        None => fetch_feed(&config.feed_url),
    }
}

fn fetch_feed(url: &str) -> Result<String> {
    let started_at = Instant::now();
    info!("event=feed_fetch module=cli status=start");

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to request alert feed from {url}"))?;

    let status = response.status();
    if !status.is_success() {
        error!(
            "event=feed_fetch module=cli status=error http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        bail!("alert feed request failed ({status}): {url}");
    }

    let body = response.text().context("failed to read alert feed body")?;
    info!(
        "event=feed_fetch module=cli status=ok http_status={} bytes={} duration_ms={}",
        status.as_u16(),
        body.len(),
        started_at.elapsed().as_millis()
    );
    Ok(body)
}
