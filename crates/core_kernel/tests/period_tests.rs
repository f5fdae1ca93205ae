//! Billing period tests

use chrono::Datelike;
use core_kernel::{today, BillingPeriod, PeriodError};

#[test]
fn current_period_matches_today() {
    let period = BillingPeriod::current();
    let now = today();
    assert_eq!(period.month(), now.month());
    assert_eq!(period.year(), now.year());
}

#[test]
fn invalid_months_are_rejected() {
    for month in [0u32, 13, 99] {
        assert_eq!(
            BillingPeriod::new(month, 2026),
            Err(PeriodError::InvalidMonth(month))
        );
    }
}

#[test]
fn twelve_next_steps_advance_one_year() {
    let mut period = BillingPeriod::new(1, 2026).unwrap();
    for _ in 0..12 {
        period = period.next();
    }
    assert_eq!(period.month(), 1);
    assert_eq!(period.year(), 2027);
}

#[test]
fn serde_round_trip() {
    let period = BillingPeriod::new(7, 2026).unwrap();
    let json = serde_json::to_string(&period).unwrap();
    let back: BillingPeriod = serde_json::from_str(&json).unwrap();
    assert_eq!(period, back);
}
