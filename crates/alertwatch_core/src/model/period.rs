//! Period value types.
//!
//! # Responsibility
//! - Represent parsed clock/date tokens and expanded atomic periods.
//! - Provide the canonical textual form used in serialized output.
//!
//! # Invariants
//! - `ClockTime` is always a valid 24-hour wall-clock time.
//! - `CalendarDate` months are 1-based (`1 = January`) and the date exists.
//! - An `AtomicPeriod` is either fully timestamped or fully degenerate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Canonical serialized form of a period endpoint.
pub const PERIOD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock time parsed from an `H:MM AM|PM` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    /// 0..=23.
    pub hour: u32,
    /// 0..=59.
    pub minute: u32,
}

impl ClockTime {
    pub fn to_naive_time(self) -> NaiveTime {
        // Fields are range-checked by the token parser.
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Calendar date parsed from a `Mon DD` token plus a caller-supplied year.
///
/// Months are 1-based to match `chrono`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    /// Returns the date if the fields describe a real calendar day.
    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One endpoint of an atomic period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeriodPoint {
    /// Local wall-clock timestamp at minute precision.
    At(NaiveDateTime),
    /// Agency text that could not be normalized.
    Unparsed(String),
}

impl PeriodPoint {
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::At(value) => Some(*value),
            Self::Unparsed(_) => None,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed(_))
    }

    /// Parses the serialized form back into a point.
    ///
    /// Text that is not a canonical timestamp is kept verbatim, which is
    /// how degenerate periods survive a serialize/deserialize cycle.
    pub fn from_serialized(value: &str) -> Self {
        match NaiveDateTime::parse_from_str(value, PERIOD_TIMESTAMP_FORMAT) {
            Ok(parsed) => Self::At(parsed),
            Err(_) => Self::Unparsed(value.to_string()),
        }
    }

    /// Ordering used for sorting periods: timestamps first, then degenerate
    /// points, which compare equal to each other so stable sorts keep input order.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::At(left), Self::At(right)) => left.cmp(right),
            (Self::At(_), Self::Unparsed(_)) => Ordering::Less,
            (Self::Unparsed(_), Self::At(_)) => Ordering::Greater,
            (Self::Unparsed(_), Self::Unparsed(_)) => Ordering::Equal,
        }
    }
}

impl Display for PeriodPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(value) => write!(f, "{}", value.format(PERIOD_TIMESTAMP_FORMAT)),
            Self::Unparsed(text) => f.write_str(text),
        }
    }
}

impl Serialize for PeriodPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_serialized(&value))
    }
}

/// One contiguous start/end interval after expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomicPeriod {
    pub start: PeriodPoint,
    pub end: PeriodPoint,
}

impl AtomicPeriod {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: PeriodPoint::At(start),
            end: PeriodPoint::At(end),
        }
    }

    /// Builds the fallback period that carries `text` in both endpoints.
    pub fn degenerate(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            start: PeriodPoint::Unparsed(text.clone()),
            end: PeriodPoint::Unparsed(text),
        }
    }

    /// Returns whether this period is the unparsed fallback marker.
    pub fn is_degenerate(&self) -> bool {
        self.start.is_unparsed() || self.end.is_unparsed()
    }

    /// Returns the raw agency text for degenerate periods.
    pub fn raw_text(&self) -> Option<&str> {
        match &self.start {
            PeriodPoint::Unparsed(text) => Some(text.as_str()),
            PeriodPoint::At(_) => None,
        }
    }
}

/// Stable sort by start point.
pub fn sort_periods(periods: &mut [AtomicPeriod]) {
    periods.sort_by(|left, right| left.start.sort_cmp(&right.start));
}
