//! Billing periods and calendar-date helpers
//!
//! A billing period is a plain (month, year) pair. Due dates are calendar
//! dates (`NaiveDate`), not instants: they are stored and compared as
//! year-month-day values independent of time zone, so a due date never
//! shifts by a day when midnight crosses zones.

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when constructing billing periods
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),
}

/// One billing period: a calendar month of a given year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    month: u32,
    year: i32,
}

impl BillingPeriod {
    /// Creates a period, validating the month range
    pub fn new(month: u32, year: i32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { month, year })
    }

    /// Returns the current month/year as a period
    pub fn current() -> Self {
        let now = today();
        Self {
            month: now.month(),
            year: now.year(),
        }
    }

    /// Returns the month (1-12)
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the period immediately after this one
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { month: 1, year: self.year + 1 }
        } else {
            Self { month: self.month + 1, year: self.year }
        }
    }

    /// Returns the period immediately before this one
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { month: 12, year: self.year - 1 }
        } else {
            Self { month: self.month - 1, year: self.year }
        }
    }

    /// First calendar day of the period
    pub fn first_day(&self) -> NaiveDate {
        // month is validated at construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated period is a valid date")
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// Today as a calendar date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Default due date for newly generated dues: today plus 30 days
pub fn default_due_date() -> NaiveDate {
    today() + Days::new(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_validation() {
        assert!(BillingPeriod::new(1, 2026).is_ok());
        assert!(BillingPeriod::new(12, 2026).is_ok());
        assert_eq!(BillingPeriod::new(0, 2026), Err(PeriodError::InvalidMonth(0)));
        assert_eq!(BillingPeriod::new(13, 2026), Err(PeriodError::InvalidMonth(13)));
    }

    #[test]
    fn test_period_navigation_wraps_year() {
        let december = BillingPeriod::new(12, 2025).unwrap();
        let january = december.next();
        assert_eq!(january.month(), 1);
        assert_eq!(january.year(), 2026);
        assert_eq!(january.previous(), december);
    }

    #[test]
    fn test_period_display() {
        let period = BillingPeriod::new(3, 2026).unwrap();
        assert_eq!(period.to_string(), "3/2026");
    }

    #[test]
    fn test_first_day() {
        let period = BillingPeriod::new(2, 2026).unwrap();
        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn test_default_due_date_is_thirty_days_out() {
        let due = default_due_date();
        assert_eq!(due - today(), chrono::Duration::days(30));
    }
}
