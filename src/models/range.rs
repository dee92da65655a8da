//! Inclusive reporting-date ranges.

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("Invalid date: {0} (expected RFC 3339 or YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid week key: {0} (expected YYYY-Www)")]
    InvalidWeekKey(String),

    #[error("A week key cannot be combined with start/end dates")]
    Conflict,
}

/// Inclusive `[start, end]` bound on a record's `date`.
///
/// No ordering check is made: an inverted range is passed to the store as-is
/// and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A range applies only when both bounds are present.
    pub fn from_bounds(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        }
    }

    /// Expand an ISO week key (`2026-W07`) to Monday 00:00 through the last
    /// millisecond of Sunday, UTC.
    pub fn from_week_key(key: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidWeekKey(key.to_string());

        let trimmed = key.trim();
        let (year, week) = trimmed
            .split_once("-W")
            .or_else(|| trimmed.split_once("-w"))
            .ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;

        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)?;
        let start = monday.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc();
        let end = last_millisecond(start, Duration::days(7)).ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Which side of a range a user-supplied date is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse a user-supplied range bound.
///
/// RFC 3339 timestamps are taken verbatim. A bare `YYYY-MM-DD` date means the
/// start of that day for [`Bound::Start`] and its last millisecond for
/// [`Bound::End`], so `start=end=<day>` covers the whole day.
pub fn parse_bound(s: &str, bound: Bound) -> Result<DateTime<Utc>, RangeError> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    let invalid = || RangeError::InvalidDate(s.to_string());
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc();

    match bound {
        Bound::Start => Ok(midnight),
        Bound::End => last_millisecond(midnight, Duration::days(1)).ok_or_else(invalid),
    }
}

/// Last millisecond of the span starting at `start`; `None` past chrono's range.
fn last_millisecond(start: DateTime<Utc>, span: Duration) -> Option<DateTime<Utc>> {
    start
        .checked_add_signed(span)?
        .checked_sub_signed(Duration::milliseconds(1))
}

/// Build the requested range from a week key or a start/end pair.
///
/// Both bounds are validated, but a lone bound means no range at all.
pub fn resolve_range(
    week: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<WeekRange>, RangeError> {
    if let Some(week) = week {
        if start.is_some() || end.is_some() {
            return Err(RangeError::Conflict);
        }
        return WeekRange::from_week_key(week).map(Some);
    }

    let start = start.map(|s| parse_bound(s, Bound::Start)).transpose()?;
    let end = end.map(|s| parse_bound(s, Bound::End)).transpose()?;
    Ok(WeekRange::from_bounds(start, end))
}
