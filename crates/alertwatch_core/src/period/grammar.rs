//! Recognized active-period grammars.
//!
//! Two shapes are recognized, tried in this order:
//! - date list: `Feb 25 and Mar 4, Tuesdays, 12:45 AM to 5:00 AM`
//! - weekly window: `Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17`
//!
//! Classification only checks the coarse shape. Tokens are captured as text
//! and parsed later, so `Feb 99` still classifies and fails in token parsing.

use once_cell::sync::Lazy;
use regex::Regex;

const CLOCK: &str = r"\d{1,2}:\d{2}\s+[ap]m";
const MONTH_DAY: &str = r"[a-z]{3}\s+\d{1,2}";

static DATE_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?P<dates>{MONTH_DAY}(?:\s+and\s+{MONTH_DAY})+)\s*,\s*(?P<weekdays>[a-z][a-z &]*?)\s*,\s*(?P<start>{CLOCK})\s+to\s+(?P<end>{CLOCK})\s*$"
    ))
    .expect("valid date list regex")
});
static WEEKLY_WINDOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?P<start_day>[a-z]{{3}})\s+(?P<start>{CLOCK})\s+to\s+(?P<end_day>[a-z]{{3}})\s+(?P<end>{CLOCK})\s*,\s*(?P<range_start>{MONTH_DAY})\s*[-–]\s*(?P<range_end>{MONTH_DAY})\s*$"
    ))
    .expect("valid weekly window regex")
});
static DATE_LIST_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+and\s+").expect("valid date separator regex"));

/// Coarse classification of one active-period string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodGrammar<'a> {
    /// Explicit dates sharing one daily window.
    DateList {
        dates: Vec<&'a str>,
        weekdays: &'a str,
        start_time: &'a str,
        end_time: &'a str,
    },
    /// Weekday-to-weekday window repeating weekly over a date range.
    WeeklyWindow {
        start_day: &'a str,
        start_time: &'a str,
        end_day: &'a str,
        end_time: &'a str,
        range_start: &'a str,
        range_end: &'a str,
    },
}

impl PeriodGrammar<'_> {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DateList { .. } => "date_list",
            Self::WeeklyWindow { .. } => "weekly_window",
        }
    }
}

/// Matches `text` against the known grammars; first match wins.
pub fn classify(text: &str) -> Option<PeriodGrammar<'_>> {
    if let Some(captures) = DATE_LIST_RE.captures(text) {
        let dates = captures.name("dates").map_or("", |m| m.as_str());
        return Some(PeriodGrammar::DateList {
            dates: DATE_LIST_SEPARATOR_RE.split(dates).collect(),
            weekdays: captures.name("weekdays").map_or("", |m| m.as_str()),
            start_time: captures.name("start").map_or("", |m| m.as_str()),
            end_time: captures.name("end").map_or("", |m| m.as_str()),
        });
    }

    if let Some(captures) = WEEKLY_WINDOW_RE.captures(text) {
        return Some(PeriodGrammar::WeeklyWindow {
            start_day: captures.name("start_day").map_or("", |m| m.as_str()),
            start_time: captures.name("start").map_or("", |m| m.as_str()),
            end_day: captures.name("end_day").map_or("", |m| m.as_str()),
            end_time: captures.name("end").map_or("", |m| m.as_str()),
            range_start: captures.name("range_start").map_or("", |m| m.as_str()),
            range_end: captures.name("range_end").map_or("", |m| m.as_str()),
        });
    }

    None
}
