//! Calendar handling for billing windows and metered events
//!
//! All dates exchanged with operators use the `dd/mm/yyyy` layout and
//! consumption events use `dd/mm/yyyy hh:mm`. A billing window is a closed
//! range of two calendar days, each taken at midnight.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Layout of every calendar date in the system
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Layout of consumption timestamps
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Errors related to temporal operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date format: '{0}' (expected dd/mm/yyyy)")]
    InvalidDateFormat(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        start: String,
        end: String,
    },
}

/// Parses a `dd/mm/yyyy` date
pub fn parse_date(raw: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TemporalError::InvalidDateFormat(raw.to_string()))
}

/// Formats a date as `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a stored consumption timestamp
///
/// A full `dd/mm/yyyy hh:mm` value is tried first. When that fails, the
/// leading whitespace-separated token is parsed as a bare date and taken at
/// midnight. Returns `None` when neither form parses.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Some(ts);
    }

    let leading = trimmed.split_whitespace().next()?;
    NaiveDate::parse_from_str(leading, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// A closed billing window `[start, end]`
///
/// Both bounds are calendar days taken at midnight, so an event stamped
/// `end 00:00` is inside the window and one stamped `end 01:00` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    #[serde(with = "dmy")]
    start: NaiveDate,
    #[serde(with = "dmy")]
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting a start that falls after the end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidDateRange {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds from `dd/mm/yyyy` text
    ///
    /// Format errors are reported before range errors, and the start bound is
    /// checked before the end bound.
    pub fn parse(start: &str, end: &str) -> Result<Self, TemporalError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns true if the instant lies within the window (inclusive)
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        let lower = self.start.and_time(NaiveTime::MIN);
        let upper = self.end.and_time(NaiveTime::MIN);
        lower <= instant && instant <= upper
    }

    /// Returns true if the calendar day lies within the window (inclusive)
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", format_date(self.start), format_date(self.end))
    }
}

/// Serde adapter for `dd/mm/yyyy` dates
///
/// ```rust,ignore
/// #[serde(with = "core_kernel::temporal::dmy")]
/// pub issue_date: NaiveDate,
/// ```
pub mod dmy {
    use super::{format_date, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }

    /// Same adapter for optional dates
    pub mod option {
        use super::{format_date, parse_date};
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_some(&format_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => parse_date(text).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }
}
