//! Active period normalizer.
//!
//! # Responsibility
//! - Expand agency active-period text into atomic start/end periods.
//! - Fall back to one degenerate period when the text is not recognized.
//!
//! # Invariants
//! - Every call returns at least one period unless strict token mode
//!   surfaces a `FormatError`.
//! - Output is deterministic for identical `(text, assumed_year, options)`.
//! - No calendar year is hard-coded; `assumed_year` is always an argument.

use crate::model::period::{AtomicPeriod, CalendarDate, ClockTime};
use crate::period::grammar::{classify, PeriodGrammar};
use crate::period::token::{
    parse_clock_time, parse_month_day, parse_weekday_abbreviation, FormatError,
};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How to treat a window whose end clock time is earlier than its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvernightPolicy {
    /// End moves forward to the next day (date list) or next week
    /// (same-weekday weekly window).
    #[default]
    RollForward,
    /// Keep the literal, possibly inverted, period.
    Literal,
}

/// Normalizer behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    /// Propagate token errors instead of falling back.
    pub strict_tokens: bool,
    pub overnight: OvernightPolicy,
}

/// Grammar-driven normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodNormalizer {
    options: NormalizeOptions,
}

impl PeriodNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Normalizes one active-period string.
    ///
    /// # Errors
    /// - Returns `FormatError` only when `strict_tokens` is set and the text
    ///   matched a grammar but contained a malformed token.
    pub fn normalize(
        &self,
        text: &str,
        assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, FormatError> {
        let Some(grammar) = classify(text) else {
            debug!(
                "event=period_normalize module=period status=fallback reason=unrecognized chars={}",
                text.chars().count()
            );
            return Ok(vec![AtomicPeriod::degenerate(text)]);
        };

        let grammar_name = grammar.name();
        match self.expand(grammar, assumed_year) {
            Ok(periods) if periods.is_empty() => {
                debug!(
                    "event=period_normalize module=period status=fallback reason=empty_expansion grammar={grammar_name}"
                );
                Ok(vec![AtomicPeriod::degenerate(text)])
            }
            Ok(periods) => {
                debug!(
                    "event=period_normalize module=period status=ok grammar={grammar_name} periods={}",
                    periods.len()
                );
                Ok(periods)
            }
            Err(err) if self.options.strict_tokens => {
                warn!(
                    "event=period_normalize module=period status=error grammar={grammar_name} error={err}"
                );
                Err(err)
            }
            Err(err) => {
                warn!(
                    "event=period_normalize module=period status=fallback reason=format_error grammar={grammar_name} error={err}"
                );
                Ok(vec![AtomicPeriod::degenerate(text)])
            }
        }
    }

    fn expand(
        &self,
        grammar: PeriodGrammar<'_>,
        assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, FormatError> {
        match grammar {
            PeriodGrammar::DateList {
                dates,
                start_time,
                end_time,
                ..
            } => self.expand_date_list(&dates, start_time, end_time, assumed_year),
            PeriodGrammar::WeeklyWindow {
                start_day,
                start_time,
                end_day,
                end_time,
                range_start,
                range_end,
            } => self.expand_weekly_window(
                WeeklyWindowTokens {
                    start_day,
                    start_time,
                    end_day,
                    end_time,
                    range_start,
                    range_end,
                },
                assumed_year,
            ),
        }
    }

    fn expand_date_list(
        &self,
        dates: &[&str],
        start_time: &str,
        end_time: &str,
        assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, FormatError> {
        let start_time = parse_clock_time(start_time)?;
        let end_time = parse_clock_time(end_time)?;

        let mut periods = Vec::with_capacity(dates.len());
        for token in dates {
            let date = resolve_date(parse_month_day(token, assumed_year)?)?;
            let start = at(date, start_time);
            let mut end = at(date, end_time);
            if end < start && self.options.overnight == OvernightPolicy::RollForward {
                end = shift_days(end, 1)?;
            }
            periods.push(AtomicPeriod::new(start, end));
        }

        Ok(periods)
    }

    fn expand_weekly_window(
        &self,
        tokens: WeeklyWindowTokens<'_>,
        assumed_year: i32,
    ) -> Result<Vec<AtomicPeriod>, FormatError> {
        let start_time = parse_clock_time(tokens.start_time)?;
        let end_time = parse_clock_time(tokens.end_time)?;
        let start_weekday = parse_weekday_abbreviation(tokens.start_day)?;
        let end_weekday = parse_weekday_abbreviation(tokens.end_day)?;

        let range_start = resolve_date(parse_month_day(tokens.range_start, assumed_year)?)?;
        // Both range dates take `assumed_year`; an inverted range expands to nothing.
        let range_end = resolve_date(parse_month_day(tokens.range_end, assumed_year)?)?;

        let day_offset = (end_weekday.num_days_from_sunday() + 7
            - start_weekday.num_days_from_sunday())
            % 7;
        let lead = (start_weekday.num_days_from_sunday() + 7
            - range_start.weekday().num_days_from_sunday())
            % 7;

        let mut periods = Vec::new();
        let mut occurrence = match range_start.checked_add_days(Days::new(u64::from(lead))) {
            Some(date) => date,
            None => return Ok(periods),
        };

        let in_range = |date: NaiveDate| date >= range_start && date <= range_end;
        while occurrence <= range_end {
            let Some(end_date) = occurrence.checked_add_days(Days::new(u64::from(day_offset)))
            else {
                break;
            };

            let start = at(occurrence, start_time);
            let mut end = at(end_date, end_time);
            if day_offset == 0
                && end < start
                && self.options.overnight == OvernightPolicy::RollForward
            {
                end = shift_days(end, 7)?;
            }

            if in_range(occurrence) || in_range(end.date()) {
                periods.push(AtomicPeriod::new(start, end));
            }

            let Some(next) = occurrence.checked_add_days(Days::new(7)) else {
                break;
            };
            occurrence = next;
        }

        Ok(periods)
    }
}

struct WeeklyWindowTokens<'a> {
    start_day: &'a str,
    start_time: &'a str,
    end_day: &'a str,
    end_time: &'a str,
    range_start: &'a str,
    range_end: &'a str,
}

/// Normalizes with default options; never fails.
pub fn normalize(text: &str, assumed_year: i32) -> Vec<AtomicPeriod> {
    PeriodNormalizer::default()
        .normalize(text, assumed_year)
        .unwrap_or_else(|_| vec![AtomicPeriod::degenerate(text)])
}

fn resolve_date(date: CalendarDate) -> Result<NaiveDate, FormatError> {
    date.to_naive_date().ok_or(FormatError::InvalidDate {
        year: date.year,
        month: date.month,
        day: date.day,
    })
}

fn at(date: NaiveDate, time: ClockTime) -> NaiveDateTime {
    date.and_time(time.to_naive_time())
}

fn shift_days(value: NaiveDateTime, days: u64) -> Result<NaiveDateTime, FormatError> {
    value
        .checked_add_days(Days::new(days))
        .ok_or_else(|| FormatError::InvalidDate {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        })
}

#[cfg(test)]
mod tests {
    use super::{normalize, NormalizeOptions, OvernightPolicy, PeriodNormalizer};
    use crate::model::period::{AtomicPeriod, PeriodPoint};
    use crate::period::token::FormatError;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn strict() -> PeriodNormalizer {
        PeriodNormalizer::new(NormalizeOptions {
            strict_tokens: true,
            overnight: OvernightPolicy::RollForward,
        })
    }

    #[test]
    fn date_list_expands_one_period_per_date() {
        let periods = normalize("Feb 25 and Mar 4, Tuesdays, 12:45 AM to 5:00 AM", 2025);
        assert_eq!(
            periods,
            vec![
                AtomicPeriod::new(dt(2025, 2, 25, 0, 45), dt(2025, 2, 25, 5, 0)),
                AtomicPeriod::new(dt(2025, 3, 4, 0, 45), dt(2025, 3, 4, 5, 0)),
            ]
        );
    }

    #[test]
    fn weekly_window_expands_every_weekend_in_range() {
        let periods = normalize("Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17", 2025);
        let expected: Vec<AtomicPeriod> = [(2, 22, 2, 24), (3, 1, 3, 3), (3, 8, 3, 10), (3, 15, 3, 17)]
            .into_iter()
            .map(|(sm, sd, em, ed)| {
                AtomicPeriod::new(dt(2025, sm, sd, 0, 15), dt(2025, em, ed, 5, 0))
            })
            .collect();
        assert_eq!(periods, expected);
    }

    #[test]
    fn weekly_window_walks_forward_to_first_start_weekday() {
        // Feb 19 2025 is a Wednesday; first Friday is Feb 21.
        let periods = normalize("Fri 10:00 PM to Fri 11:30 PM, Feb 19 - Feb 28", 2025);
        assert_eq!(
            periods,
            vec![
                AtomicPeriod::new(dt(2025, 2, 21, 22, 0), dt(2025, 2, 21, 23, 30)),
                AtomicPeriod::new(dt(2025, 2, 28, 22, 0), dt(2025, 2, 28, 23, 30)),
            ]
        );
    }

    #[test]
    fn weekly_window_range_across_new_year_keeps_assumed_year() {
        let text = "Sat 12:15 AM to Mon 5:00 AM, Dec 27 - Jan 5";
        let periods = normalize(text, 2025);
        assert_eq!(periods, vec![AtomicPeriod::degenerate(text)]);
    }

    #[test]
    fn weekly_window_without_occurrence_falls_back() {
        // Mar 3 2025 is a Monday, Mar 4 a Tuesday: no Saturday in range.
        let text = "Sat 12:15 AM to Mon 5:00 AM, Mar 3 - Mar 4";
        assert_eq!(normalize(text, 2025), vec![AtomicPeriod::degenerate(text)]);
    }

    #[test]
    fn unrecognized_text_passes_through() {
        let text = "No service due to construction";
        let periods = normalize(text, 2025);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, PeriodPoint::Unparsed(text.to_string()));
        assert_eq!(periods[0].end, PeriodPoint::Unparsed(text.to_string()));
    }

    #[test]
    fn overnight_date_list_rolls_to_next_day_by_default() {
        let periods = normalize("Feb 25 and Mar 4, Tuesdays, 11:00 PM to 1:00 AM", 2025);
        assert_eq!(
            periods[0],
            AtomicPeriod::new(dt(2025, 2, 25, 23, 0), dt(2025, 2, 26, 1, 0))
        );
    }

    #[test]
    fn overnight_literal_policy_keeps_inverted_period() {
        let normalizer = PeriodNormalizer::new(NormalizeOptions {
            strict_tokens: false,
            overnight: OvernightPolicy::Literal,
        });
        let periods = normalizer
            .normalize("Feb 25 and Mar 4, Tuesdays, 11:00 PM to 1:00 AM", 2025)
            .unwrap();
        assert_eq!(
            periods[0],
            AtomicPeriod::new(dt(2025, 2, 25, 23, 0), dt(2025, 2, 25, 1, 0))
        );
    }

    #[test]
    fn malformed_token_falls_back_unless_strict() {
        let text = "Feb 99 and Mar 4, Tuesdays, 12:45 AM to 5:00 AM";
        assert_eq!(normalize(text, 2025), vec![AtomicPeriod::degenerate(text)]);

        let err = strict().normalize(text, 2025).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidDate {
                year: 2025,
                month: 2,
                day: 99
            }
        );
    }

    #[test]
    fn unknown_weekday_is_format_error_in_strict_mode() {
        let err = strict()
            .normalize("Xyz 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17", 2025)
            .unwrap_err();
        assert_eq!(err, FormatError::UnknownWeekday("Xyz".to_string()));
    }

    #[test]
    fn strict_mode_still_falls_back_for_unrecognized_text() {
        let periods = strict().normalize("Weekends until further notice", 2025).unwrap();
        assert_eq!(
            periods,
            vec![AtomicPeriod::degenerate("Weekends until further notice")]
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let text = "Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17";
        assert_eq!(normalize(text, 2025), normalize(text, 2025));
    }
}
