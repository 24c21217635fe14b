//! Source of "now" and "today".
//!
//! The gateways check session expiry against a [`Clock`], and dashboard
//! commands stamp rows and pick ledger dates with the same one. Tests pin
//! it with [`FixedClock`].

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::fmt::Debug;

pub trait Clock: Debug + Send + Sync {
    /// Current instant, for `created_at` / `updated_at` stamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current business day, for ledger dates.
    fn today(&self) -> NaiveDate;
}

/// The wall clock. "Today" follows the machine's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock { now }
    }

    /// Noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        FixedClock::new(noon.and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_on_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let clock = FixedClock::on(date);

        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().to_rfc3339(), "2026-10-19T12:00:00+00:00");
    }
}
