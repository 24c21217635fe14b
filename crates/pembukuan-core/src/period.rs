//! # Report Periods
//!
//! Calendar windows used by reports and list filters.
//!
//! ```text
//! Daily(2026-10-19)            [2026-10-19, 2026-10-19]
//! Weekly { end: 2026-10-19 }   [2026-10-13, 2026-10-19]   (7 days)
//! Monthly(2026-10)             [2026-10-01, 2026-10-31]
//! ```
//!
//! Bounds are inclusive calendar dates. A "day" is the whole local day;
//! no time-of-day arithmetic happens here.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Indonesian short month names, January first.
pub const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Display label for a day, e.g. `19 Okt`.
pub fn short_day_label(date: NaiveDate) -> String {
    let month = SHORT_MONTHS[date.month0() as usize];
    format!("{} {}", date.day(), month)
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: date,
        }
    }

    /// The 7 days ending on `end`, inclusive.
    pub fn trailing_week(end: NaiveDate) -> Self {
        DateRange {
            start: end.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// =============================================================================
// Year-Month
// =============================================================================

/// A validated calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// ## Errors
    /// `InvalidFormat` if `month` is outside 1..=12 or the year is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| YearMonth { first_day })
            .ok_or_else(|| {
                ValidationError::invalid_format("month", format!("{year}-{month:02} is not a month"))
            })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ValidationError::invalid_format("month", format!("expected YYYY-MM, got {s:?}"));
        let (year, month) = s.trim().split_once('-').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Period
// =============================================================================

/// Which report the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    /// One calendar day.
    Daily { date: NaiveDate },
    /// The trailing 7 days ending on `end`.
    Weekly { end: NaiveDate },
    /// A calendar month.
    Monthly { month: YearMonth },
}

impl Period {
    /// Dates covered by this period.
    pub fn range(&self) -> DateRange {
        match self {
            Period::Daily { date } => DateRange::day(*date),
            Period::Weekly { end } => DateRange::trailing_week(*end),
            Period::Monthly { month } => DateRange::new(month.first_day(), month.last_day()),
        }
    }

    /// Indonesian period name used in export filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            Period::Daily { .. } => "harian",
            Period::Weekly { .. } => "mingguan",
            Period::Monthly { .. } => "bulanan",
        }
    }

    /// Text written after `Periode,` in the exported report.
    pub fn descriptor(&self) -> String {
        match self {
            Period::Daily { date } => date.to_string(),
            Period::Weekly { .. } => "7 Hari Terakhir".to_string(),
            Period::Monthly { month } => month.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
