//! Monthly dues
//!
//! A due is one billing obligation for one player in one month. Its life
//! cycle runs pending -> partial -> paid, with a sweep pushing unpaid dues
//! to overdue once the grace window elapses. `amount_paid + balance` always
//! equals `amount`, and all mutations go through methods that preserve that.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use core_kernel::{BillingPeriod, DueId, Money, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DuesError;

/// Payment state of a due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    /// Nothing paid yet
    Pending,
    /// Partially paid, balance remains
    Partial,
    /// Fully settled
    Paid,
    /// Unpaid past the tolerance window (set by the sweep)
    Overdue,
}

impl DueStatus {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Pending => "pending",
            DueStatus::Partial => "partial",
            DueStatus::Paid => "paid",
            DueStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DueStatus::Pending),
            "partial" => Ok(DueStatus::Partial),
            "paid" => Ok(DueStatus::Paid),
            "overdue" => Ok(DueStatus::Overdue),
            other => Err(format!("unknown due status: {other}")),
        }
    }
}

/// A monthly due for one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Due {
    /// Unique identifier
    pub id: DueId,
    /// Player this due bills
    pub player_id: PlayerId,
    /// Billing month
    pub period: BillingPeriod,
    /// Principal amount (the category fee at generation time)
    pub amount: Money,
    /// Sum of non-voided payments applied so far
    pub amount_paid: Money,
    /// What is still owed
    pub balance: Money,
    /// Date the due must be paid by
    pub due_date: NaiveDate,
    /// Current payment state
    pub status: DueStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every update
    pub version: i64,
}

impl Due {
    /// Creates a fresh pending due with nothing paid
    pub fn new(
        player_id: PlayerId,
        period: BillingPeriod,
        amount: Money,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: DueId::new(),
            player_id,
            period,
            amount,
            amount_paid: Money::zero(amount.currency()),
            balance: amount,
            due_date,
            status: DueStatus::Pending,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Applies a payment to this due
    ///
    /// Adds the amount to `amount_paid` and recomputes the balance, clamping
    /// it at zero. Fully covered dues become `Paid`, anything else `Partial`.
    /// Rejects payments against an already settled due and amounts above the
    /// remaining balance, so the check holds on every path that re-reads and
    /// re-applies, not just at the recording boundary.
    pub fn apply_payment(&mut self, amount: Money) -> Result<(), DuesError> {
        if self.status == DueStatus::Paid {
            return Err(DuesError::AlreadySettled(self.id));
        }
        if amount > self.balance {
            return Err(DuesError::ExceedsBalance {
                requested: amount,
                available: self.balance,
            });
        }
        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        let remaining = self.amount.checked_sub(&self.amount_paid)?;
        if remaining.is_positive() {
            self.balance = remaining;
            self.status = DueStatus::Partial;
        } else {
            self.balance = remaining.floor_zero();
            self.status = DueStatus::Paid;
        }
        Ok(())
    }

    /// Undoes a previously applied payment
    ///
    /// Exact inverse of `apply_payment` for the same amount: subtracts it
    /// from `amount_paid` and restores the balance. A due with nothing left
    /// paid returns to `Pending`; otherwise it is `Partial` again (an
    /// `Overdue` mark is recomputed by the next sweep).
    pub fn reverse_payment(&mut self, amount: Money) -> Result<(), DuesError> {
        let remaining_paid = self.amount_paid.checked_sub(&amount)?;
        if remaining_paid.is_positive() {
            self.amount_paid = remaining_paid;
            self.balance = self.amount.checked_sub(&remaining_paid)?;
            self.status = DueStatus::Partial;
        } else {
            self.amount_paid = Money::zero(self.amount.currency());
            self.balance = self.amount;
            self.status = DueStatus::Pending;
        }
        Ok(())
    }

    /// Moves the payment deadline
    pub fn reschedule(&mut self, due_date: NaiveDate) {
        self.due_date = due_date;
    }

    /// True when the calendar deadline has passed and the due is not settled
    ///
    /// This is the date-based view reports use; it is independent of whether
    /// the sweep has already stamped the row `Overdue`.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status != DueStatus::Paid && self.due_date < today
    }

    /// True when the due is unpaid and older than the tolerance cutoff
    pub fn is_past_tolerance(&self, today: NaiveDate, tolerance_days: i64) -> bool {
        matches!(self.status, DueStatus::Pending | DueStatus::Partial)
            && self.due_date < today - Duration::days(tolerance_days)
    }

    /// True when there is still money owed on this due
    pub fn has_outstanding_balance(&self) -> bool {
        self.status != DueStatus::Paid && self.balance.is_positive()
    }

    /// Checks that the due can be deleted
    ///
    /// A due with recorded payments (voided or not) is part of the financial
    /// history and must not be removed.
    pub fn ensure_deletable(&self, payment_count: u64) -> Result<(), DuesError> {
        if payment_count > 0 {
            return Err(DuesError::invalid(format!(
                "due {} has {} recorded payment(s) and cannot be deleted",
                self.id, payment_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn cop(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::COP)
    }

    fn due_of(amount: rust_decimal::Decimal) -> Due {
        Due::new(
            PlayerId::new(),
            BillingPeriod::new(3, 2026).unwrap(),
            cop(amount),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_new_due_is_pending_with_full_balance() {
        let due = due_of(dec!(50000));
        assert_eq!(due.status, DueStatus::Pending);
        assert_eq!(due.balance, cop(dec!(50000)));
        assert!(due.amount_paid.is_zero());
        assert_eq!(due.version, 0);
    }

    #[test]
    fn test_partial_payment_leaves_balance() {
        let mut due = due_of(dec!(50000));
        due.apply_payment(cop(dec!(20000))).unwrap();
        assert_eq!(due.status, DueStatus::Partial);
        assert_eq!(due.amount_paid, cop(dec!(20000)));
        assert_eq!(due.balance, cop(dec!(30000)));
    }

    #[test]
    fn test_exact_payment_settles() {
        let mut due = due_of(dec!(50000));
        due.apply_payment(cop(dec!(50000))).unwrap();
        assert_eq!(due.status, DueStatus::Paid);
        assert!(due.balance.is_zero());
    }

    #[test]
    fn test_overshoot_is_rejected_without_mutation() {
        let mut due = due_of(dec!(50000));
        due.apply_payment(cop(dec!(30000))).unwrap();

        let error = due.apply_payment(cop(dec!(30000))).unwrap_err();
        assert!(matches!(
            error,
            DuesError::ExceedsBalance { available, .. } if available == cop(dec!(20000))
        ));
        assert_eq!(due.amount_paid, cop(dec!(30000)));
        assert_eq!(due.balance, cop(dec!(20000)));
        assert_eq!(due.status, DueStatus::Partial);
    }

    #[test]
    fn test_payment_on_settled_due_is_rejected() {
        let mut due = due_of(dec!(50000));
        due.apply_payment(cop(dec!(50000))).unwrap();
        let error = due.apply_payment(cop(dec!(1))).unwrap_err();
        assert!(matches!(error, DuesError::AlreadySettled(_)));
    }

    #[test]
    fn test_reverse_is_exact_inverse() {
        let mut due = due_of(dec!(100000));
        due.apply_payment(cop(dec!(40000))).unwrap();
        due.reverse_payment(cop(dec!(40000))).unwrap();
        assert_eq!(due.status, DueStatus::Pending);
        assert!(due.amount_paid.is_zero());
        assert_eq!(due.balance, cop(dec!(100000)));
    }

    #[test]
    fn test_reverse_one_of_two_payments_returns_to_partial() {
        let mut due = due_of(dec!(100000));
        due.apply_payment(cop(dec!(40000))).unwrap();
        due.apply_payment(cop(dec!(30000))).unwrap();
        due.reverse_payment(cop(dec!(30000))).unwrap();
        assert_eq!(due.status, DueStatus::Partial);
        assert_eq!(due.amount_paid, cop(dec!(40000)));
        assert_eq!(due.balance, cop(dec!(60000)));
    }

    #[test]
    fn test_reverse_on_settled_due_reopens_it() {
        let mut due = due_of(dec!(50000));
        due.apply_payment(cop(dec!(50000))).unwrap();
        due.reverse_payment(cop(dec!(50000))).unwrap();
        assert_eq!(due.status, DueStatus::Pending);
        assert_eq!(due.balance, cop(dec!(50000)));
    }

    #[test]
    fn test_past_due_is_date_based() {
        let mut due = due_of(dec!(50000));
        let after = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let on = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert!(due.is_past_due(after));
        assert!(!due.is_past_due(on));

        due.apply_payment(cop(dec!(50000))).unwrap();
        assert!(!due.is_past_due(after));
    }

    #[test]
    fn test_tolerance_window_delays_overdue() {
        let due = due_of(dec!(50000));
        // due 2026-03-31, tolerance 5 days: cutoff reached on 2026-04-06
        let inside = NaiveDate::from_ymd_opt(2026, 4, 5).unwrap();
        let outside = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        assert!(!due.is_past_tolerance(inside, 5));
        assert!(due.is_past_tolerance(outside, 5));
    }

    #[test]
    fn test_settled_due_never_past_tolerance() {
        let mut due = due_of(dec!(50000));
        due.apply_payment(cop(dec!(50000))).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert!(!due.is_past_tolerance(later, 0));
    }

    #[test]
    fn test_deletion_guard() {
        let due = due_of(dec!(50000));
        assert!(due.ensure_deletable(0).is_ok());
        assert!(matches!(
            due.ensure_deletable(2),
            Err(DuesError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            DueStatus::Pending,
            DueStatus::Partial,
            DueStatus::Paid,
            DueStatus::Overdue,
        ] {
            assert_eq!(status.as_str().parse::<DueStatus>().unwrap(), status);
        }
    }

    mod balance_invariant_props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn paid_plus_balance_equals_amount(
                principal in 1u32..10_000_000,
                payments in proptest::collection::vec(1u32..5_000_000, 0..6),
            ) {
                let mut due = due_of(rust_decimal::Decimal::from(principal));
                for payment in payments {
                    let amount = cop(rust_decimal::Decimal::from(payment));
                    // rejections (settled / overshoot) must leave the due untouched
                    let _ = due.apply_payment(amount);
                    let recomposed = due.amount_paid.checked_add(&due.balance).unwrap();
                    prop_assert_eq!(recomposed, due.amount);
                    prop_assert!(!due.balance.is_negative());
                }
            }
        }
    }
}
