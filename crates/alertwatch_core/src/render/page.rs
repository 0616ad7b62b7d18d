//! Static HTML page rendering.
//!
//! # Invariants
//! - All agency text is HTML-escaped before it reaches the document.
//! - Degenerate periods render their raw text, never a fabricated time.

use crate::model::alert::NormalizedAlert;
use crate::model::period::{AtomicPeriod, PeriodPoint, PERIOD_TIMESTAMP_FORMAT};
use crate::service::snapshot_service::SnapshotDiff;
use chrono::NaiveDateTime;

const DISPLAY_FORMAT: &str = "%a %b %-d, %-I:%M %p";

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
.periods li{margin:.25rem 0}.unparsed{font-style:italic}\
.badge{font-size:.75rem;padding:0 .4rem;border-radius:.5rem;background:#ddd}\
.badge.new{background:#b9f6ca}.badge.updated{background:#ffe082}";

/// Page-level values that are not part of any alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub title: String,
    pub generated_at: NaiveDateTime,
    /// Change classification shown next to each contributing alert id.
    pub diff: SnapshotDiff,
}

/// Renders a complete HTML document.
pub fn render_page(alerts: &[NormalizedAlert], context: &PageContext) -> String {
    let title = escape_html(&context.title);
    let mut html = String::with_capacity(2048);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n"));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{title}</h1>\n"));
    html.push_str(&format!(
        "<p class=\"generated\">Updated {}</p>\n",
        time_element(&context.generated_at)
    ));

    if alerts.is_empty() {
        html.push_str("<p class=\"empty\">No matching service alerts.</p>\n");
    }

    for alert in alerts {
        html.push_str("<section class=\"alert\">\n");
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(&alert.header)));
        html.push_str("<ul class=\"periods\">\n");
        for period in &alert.atomic_periods {
            html.push_str(&render_period(period));
        }
        html.push_str("</ul>\n");
        html.push_str(&render_sources(alert, &context.diff));
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escapes text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_period(period: &AtomicPeriod) -> String {
    match (&period.start, &period.end) {
        (PeriodPoint::At(start), PeriodPoint::At(end)) => format!(
            "<li>{} &rarr; {}</li>\n",
            time_element(start),
            time_element(end)
        ),
        _ => format!(
            "<li class=\"unparsed\">{}</li>\n",
            escape_html(period.raw_text().unwrap_or_default())
        ),
    }
}

fn render_sources(alert: &NormalizedAlert, diff: &SnapshotDiff) -> String {
    let badges: Vec<String> = alert
        .alert_ids
        .iter()
        .map(|alert_id| match diff.change_for(alert_id) {
            Some(change) => format!(
                "<span class=\"badge {0}\">{0}</span> {1}",
                change.as_str(),
                escape_html(alert_id)
            ),
            None => escape_html(alert_id),
        })
        .collect();
    format!("<p class=\"sources\">{}</p>\n", badges.join(", "))
}

fn time_element(value: &NaiveDateTime) -> String {
    format!(
        "<time datetime=\"{}\">{}</time>",
        value.format(PERIOD_TIMESTAMP_FORMAT),
        value.format(DISPLAY_FORMAT)
    )
}
