//! Calendar date value type.
//!
//! # Responsibility
//! - Represent a year-month-day triple without any time-zone component.
//! - Reject impossible dates at construction time.
//!
//! # Invariants
//! - Every `CalendarDate` value is a valid proleptic Gregorian date.
//! - Wire form is always `YYYY-MM-DD`.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ISO_DATE_LEN: usize = 10;

/// Validation error for calendar date input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Year/month/day triple does not name a real day.
    OutOfRange { year: i32, month: u32, day: u32 },
    /// Text input is not an ISO date or ISO date-time.
    Unparsable(String),
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { year, month, day } => {
                write!(f, "invalid calendar date {year:04}-{month:02}-{day:02}")
            }
            Self::Unparsable(value) => write!(f, "unparsable calendar date `{value}`"),
        }
    }
}

impl Error for DateError {}

/// Local calendar date used by recurrence math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Builds a date from its parts.
    ///
    /// # Errors
    /// - Returns `DateError::OutOfRange` for impossible triples such as
    ///   `2023-02-29` or month `13`.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateError::OutOfRange { year, month, day })
    }

    /// Parses `YYYY-MM-DD` or an ISO-8601 date-time whose date part comes first.
    ///
    /// Only the leading date is read; any time and offset suffix is ignored
    /// because stored dates are local-calendar dates.
    pub fn parse(value: &str) -> Result<Self, DateError> {
        let trimmed = value.trim();
        let date_part = match trimmed.get(..ISO_DATE_LEN) {
            Some(prefix) if trimmed.len() == ISO_DATE_LEN => prefix,
            Some(prefix) if trimmed[ISO_DATE_LEN..].starts_with(['T', 't', ' ']) => prefix,
            _ => return Err(DateError::Unparsable(trimmed.to_string())),
        };

        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DateError::Unparsable(trimmed.to_string()))
    }

    /// Today's date on the local calendar.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// `(month, day)` pair used as the recurrence anchor.
    pub fn month_day(self) -> (u32, u32) {
        (self.0.month(), self.0.day())
    }

    pub fn is_leap_day(self) -> bool {
        self.month_day() == (2, 29)
    }

    pub(crate) fn as_naive(self) -> NaiveDate {
        self.0
    }

    pub(crate) fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(value: CalendarDate) -> Self {
        value.to_string()
    }
}
