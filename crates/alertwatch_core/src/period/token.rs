//! Lexical token parsing for active-period text.
//!
//! # Responsibility
//! - Parse `H:MM AM|PM` clock tokens into 24-hour `ClockTime`.
//! - Parse `Mon DD` tokens into `CalendarDate` using a caller-supplied year.
//! - Map three-letter weekday abbreviations to `chrono::Weekday`.
//!
//! # Invariants
//! - 12 AM maps to hour 0; 12 PM stays 12; other PM hours add 12.
//! - The year is never inferred here; it is always the `assumed_year` argument.
//! - Every returned value is a valid time/date; anything else is `FormatError`.

use crate::model::period::{CalendarDate, ClockTime};
use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static CLOCK_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s+([AaPp][Mm])$").expect("valid clock time regex")
});
static MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3})\s+(\d{1,2})$").expect("valid month day regex"));

const MONTH_ABBREVIATIONS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Fine-grained token failure inside text that matched a grammar's outer shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Text is not `H:MM AM|PM`, or hour/minute is out of range.
    InvalidClockTime(String),
    /// Text is not `Mon DD`.
    InvalidMonthDay(String),
    /// Three-letter month abbreviation is not recognized.
    UnknownMonth(String),
    /// Three-letter weekday abbreviation is not recognized.
    UnknownWeekday(String),
    /// Month/day pair does not exist in the assumed year.
    InvalidDate { year: i32, month: u32, day: u32 },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidClockTime(value) => write!(f, "invalid clock time `{value}`"),
            Self::InvalidMonthDay(value) => write!(f, "invalid month/day token `{value}`"),
            Self::UnknownMonth(value) => write!(f, "unknown month abbreviation `{value}`"),
            Self::UnknownWeekday(value) => write!(f, "unknown weekday abbreviation `{value}`"),
            Self::InvalidDate { year, month, day } => {
                write!(f, "date {year:04}-{month:02}-{day:02} does not exist")
            }
        }
    }
}

impl Error for FormatError {}

/// Parses a clock token such as `12:45 AM` or `5:00 pm`.
///
/// # Errors
/// - `InvalidClockTime` when the token shape is wrong or the resulting
///   hour/minute is outside 24-hour range (e.g. `24:00 AM`, `1:75 AM`).
pub fn parse_clock_time(text: &str) -> Result<ClockTime, FormatError> {
    let trimmed = text.trim();
    let invalid = || FormatError::InvalidClockTime(trimmed.to_string());
    let captures = CLOCK_TIME_RE.captures(trimmed).ok_or_else(invalid)?;

    let hour: u32 = captures[1].parse().map_err(|_| invalid())?;
    let minute: u32 = captures[2].parse().map_err(|_| invalid())?;
    let is_pm = captures[3].eq_ignore_ascii_case("pm");

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (h, true) if h < 12 => h + 12,
        (h, _) => h,
    };

    if hour > 23 || minute > 59 {
        return Err(invalid());
    }

    Ok(ClockTime { hour, minute })
}

/// Parses a `Mon DD` token such as `Feb 25` in `assumed_year`.
///
/// Month matching is case-insensitive.
///
/// # Errors
/// - `InvalidMonthDay` when the token shape is wrong.
/// - `UnknownMonth` for an unrecognized abbreviation.
/// - `InvalidDate` when the day does not exist (e.g. `Feb 30`, `Feb 99`).
pub fn parse_month_day(text: &str, assumed_year: i32) -> Result<CalendarDate, FormatError> {
    let trimmed = text.trim();
    let captures = MONTH_DAY_RE
        .captures(trimmed)
        .ok_or_else(|| FormatError::InvalidMonthDay(trimmed.to_string()))?;

    let month = parse_month_abbreviation(&captures[1])?;
    let day: u32 = captures[2]
        .parse()
        .map_err(|_| FormatError::InvalidMonthDay(trimmed.to_string()))?;

    let date = CalendarDate {
        year: assumed_year,
        month,
        day,
    };
    if date.to_naive_date().is_none() {
        return Err(FormatError::InvalidDate {
            year: assumed_year,
            month,
            day,
        });
    }

    Ok(date)
}

/// Maps `Sun`..`Sat` (case-insensitive) to a weekday.
///
/// Numbering follows `Weekday::num_days_from_sunday` (Sunday = 0).
pub fn parse_weekday_abbreviation(text: &str) -> Result<Weekday, FormatError> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "sun" => Ok(Weekday::Sun),
        "mon" => Ok(Weekday::Mon),
        "tue" => Ok(Weekday::Tue),
        "wed" => Ok(Weekday::Wed),
        "thu" => Ok(Weekday::Thu),
        "fri" => Ok(Weekday::Fri),
        "sat" => Ok(Weekday::Sat),
        _ => Err(FormatError::UnknownWeekday(trimmed.to_string())),
    }
}

fn parse_month_abbreviation(text: &str) -> Result<u32, FormatError> {
    let lowered = text.to_ascii_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|candidate| *candidate == lowered)
        .map(|index| index as u32 + 1)
        .ok_or_else(|| FormatError::UnknownMonth(text.to_string()))
}
