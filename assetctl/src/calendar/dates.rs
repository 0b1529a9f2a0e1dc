//! Date handling for the booking calendar.
//!
//! All calendar arithmetic is done in UTC: a "day" is a UTC calendar day and a month runs from
//! the first day at 00:00:00.000 to the last day at 23:59:59.999.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a booking's dates could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("'{0}' is not a valid date")]
    Unparseable(String),

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: DateTime<Utc>, end: DateTime<Utc> },

    #[error("'{0}' is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),
}

/// Parse a booking date: RFC 3339, a timestamp without offset (taken as UTC), or a plain
/// `YYYY-MM-DD` date (midnight UTC).
pub fn parse_booking_date(value: &str) -> Result<DateTime<Utc>, DateError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| DateError::Unparseable(value.to_string()))
}

pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of the day
pub fn end_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(at) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// A validated booking interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DateError> {
        if end < start {
            return Err(DateError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
        Self::new(parse_booking_date(start)?, parse_booking_date(end)?)
    }

    /// Closed-interval overlap
    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `day` falls within [start of the first day, end of the last day]
    pub fn covers_day(&self, day: NaiveDate) -> bool {
        day >= self.start.date_naive() && day <= self.end.date_naive()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first.pred_opt().unwrap_or(self.first)
    }

    pub fn next(&self) -> Self {
        Self {
            first: self.first.checked_add_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            first: self.first.checked_sub_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    /// The month as a closed interval, start of its first day to end of its last
    pub fn span(&self) -> DateSpan {
        let start = self.first.and_time(NaiveTime::MIN).and_utc();
        DateSpan {
            start,
            end: end_of_day(self.last_day().and_time(NaiveTime::MIN).and_utc()),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day.year() == self.year() && day.month() == self.month()
    }

    /// The Monday on or before the first of the month
    pub fn grid_start(&self) -> NaiveDate {
        let offset = self.first.weekday().num_days_from_monday();
        self.first.checked_sub_days(Days::new(offset.into())).unwrap_or(self.first)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DateError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for Month {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
