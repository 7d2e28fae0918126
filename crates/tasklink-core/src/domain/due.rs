//! Due dates shared by both stores
//!
//! The remote store exposes due dates either as a plain calendar date or as
//! an ISO 8601 date-time with an offset; the local store keeps a calendar
//! date plus an optional time of day. Comparison between the two sides only
//! ever looks at the calendar date.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A calendar date with an optional time of day
///
/// A time of exactly midnight carries no information (the remote store uses
/// it for "all day") and is normalized away on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DueDate {
    date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<NaiveTime>,
}

impl DueDate {
    /// An all-day due date
    #[must_use]
    pub const fn on(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    /// A due date with a time of day; midnight collapses to all-day
    #[must_use]
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        let time = if time.hour() == 0 && time.minute() == 0 && time.second() == 0 {
            None
        } else {
            Some(time.with_nanosecond(0).unwrap_or(time))
        };
        Self { date, time }
    }

    /// Parse a remote-store date value
    ///
    /// Accepts `YYYY-MM-DD` and RFC 3339 date-times. A date-time keeps the
    /// wall-clock date and time of its own offset, so
    /// `2024-05-01T00:00:00Z` becomes the all-day date 2024-05-01.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidDueDate`] if neither form parses.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if value.contains('T') {
            let dt = DateTime::parse_from_rfc3339(value)
                .map_err(|e| DomainError::InvalidDueDate(format!("{value}: {e}")))?;
            let local = dt.naive_local();
            Ok(Self::at(local.date(), local.time()))
        } else {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Self::on)
                .map_err(|e| DomainError::InvalidDueDate(format!("{value}: {e}")))
        }
    }

    /// Calendar date used for cross-store comparison
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Time of day, if one other than midnight was set
    #[must_use]
    pub const fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}

impl Display for DueDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date, time.format("%H:%M")),
            None => write!(f, "{}", self.date),
        }
    }
}

/// Calendar-date view of an optional due date
#[must_use]
pub fn due_day(due: Option<&DueDate>) -> Option<NaiveDate> {
    due.map(DueDate::date)
}
