//! Calendar month used to bucket reports.
//!
//! Example report date: 2021-03-05  =>  Month { year: 2021, month: 3 }
//!
//! Ordering is chronological so it can key BTreeMap buckets directly.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamped variants some exports use instead of a bare date.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u8,
}

impl Month {
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Truncate a `YYYY-MM-DD` date to its month. The date must exist on
    /// the calendar; the day is then dropped.
    pub fn from_date(s: &str) -> Option<Self> {
        let s = s.trim();
        let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok().or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .map(|dt| dt.date())
        })?;
        Self::new(date.year(), date.month() as u8)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
