//! Due ledger
//!
//! Reconciliation service for dues: applies and reverses payments, runs the
//! overdue sweep, and answers due queries. All due mutations go through the
//! optimistic version protocol with one retry, and payment postings persist
//! the payment row and the reconciled due in a single transaction.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use core_kernel::{today, BillingPeriod, Currency, DueId, Money, PlayerId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::due::{Due, DueStatus};
use crate::error::DuesError;
use crate::payment::Payment;
use crate::ports::{ConfigStore, DueFilter, DueStore, PaymentStore};
use crate::settings;

/// Month-level collection summary
///
/// `past_due` is date-based: any unsettled due past its deadline counts,
/// whether or not the sweep has stamped it `Overdue` yet. Every other due
/// falls into an on-time bucket, split on whether anything has been paid,
/// so an overdue-stamped due rescheduled back into the future counts as on
/// time again and the four buckets always sum to `total_dues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Billing month summarized
    pub period: BillingPeriod,
    /// Number of dues in the month
    pub total_dues: u64,
    /// Sum of all due principals
    pub expected: Money,
    /// Sum of everything paid so far
    pub collected: Money,
    /// Sum of remaining balances
    pub outstanding: Money,
    /// collected / expected, rounded to a whole percent
    pub percent_collected: Decimal,
    /// paid dues / total dues, rounded to a whole percent
    pub percent_compliance: Decimal,
    /// Fully settled dues
    pub paid: u64,
    /// Untouched dues still within their deadline
    pub pending_on_time: u64,
    /// Partially paid dues still within their deadline
    pub partial_on_time: u64,
    /// Unsettled dues past their deadline
    pub past_due: u64,
}

impl PeriodSummary {
    /// Computes the summary from the month's dues as of `today`
    pub fn from_dues(period: BillingPeriod, dues: &[Due], today: NaiveDate) -> Self {
        let currency = dues
            .first()
            .map(|due| due.amount.currency())
            .unwrap_or_default();
        let mut expected = Money::zero(currency);
        let mut collected = Money::zero(currency);
        let mut outstanding = Money::zero(currency);
        let mut paid = 0u64;
        let mut pending_on_time = 0u64;
        let mut partial_on_time = 0u64;
        let mut past_due = 0u64;

        for due in dues {
            expected = expected + due.amount;
            collected = collected + due.amount_paid;
            outstanding = outstanding + due.balance;
            if due.status == DueStatus::Paid {
                paid += 1;
            } else if due.is_past_due(today) {
                past_due += 1;
            } else if due.amount_paid.is_zero() {
                pending_on_time += 1;
            } else {
                partial_on_time += 1;
            }
        }

        let total_dues = dues.len() as u64;
        let percent_collected = round_percent(collected.percentage_of(&expected));
        let percent_compliance = if total_dues == 0 {
            Decimal::ZERO
        } else {
            round_percent(Decimal::from(paid) / Decimal::from(total_dues) * Decimal::ONE_HUNDRED)
        };

        Self {
            period,
            total_dues,
            expected,
            collected,
            outstanding,
            percent_collected,
            percent_compliance,
            paid,
            pending_on_time,
            partial_on_time,
            past_due,
        }
    }
}

/// Rounds a percentage to a whole number, halves away from zero
pub(crate) fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Reconciliation service for dues
#[derive(Clone)]
pub struct DueLedger {
    dues: Arc<dyn DueStore>,
    payments: Arc<dyn PaymentStore>,
    config: Arc<dyn ConfigStore>,
}

impl DueLedger {
    pub fn new(
        dues: Arc<dyn DueStore>,
        payments: Arc<dyn PaymentStore>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            dues,
            payments,
            config,
        }
    }

    /// Looks up a due by id
    pub async fn due(&self, id: DueId) -> Result<Due, DuesError> {
        self.dues
            .find(id)
            .await?
            .ok_or(DuesError::DueNotFound(id))
    }

    /// Lists dues matching the filter
    pub async fn list(&self, filter: &DueFilter) -> Result<Vec<Due>, DuesError> {
        Ok(self.dues.list(filter).await?)
    }

    /// Payment history of a player, newest period first
    pub async fn dues_for_player(&self, player_id: PlayerId) -> Result<Vec<Due>, DuesError> {
        Ok(self.dues.for_player(player_id).await?)
    }

    /// Posts a payment: inserts it and applies it to its due atomically
    ///
    /// On a version conflict the due is re-read and the payment re-applied
    /// once; a second conflict surfaces to the caller. The re-apply
    /// validates against the fresh balance, so a competing payment that
    /// landed in between surfaces as `ExceedsBalance` instead of
    /// overdrawing the due.
    pub async fn post_payment(&self, payment: &Payment) -> Result<Due, DuesError> {
        let mut conflict: Option<DuesError> = None;
        for attempt in 0..2 {
            let mut due = self.due(payment.due_id).await?;
            due.apply_payment(payment.amount)?;
            match self.payments.insert_with_due(payment, &due).await {
                Ok(stored) => return Ok(stored),
                Err(error) if error.is_concurrency_conflict() => {
                    tracing::debug!(due_id = %due.id, attempt, "due version moved, retrying");
                    conflict = Some(error.into());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Err(conflict.unwrap_or_else(|| {
            DuesError::ConcurrencyConflict("due update retry exhausted".into())
        }))
    }

    /// Posts a void: persists the voided payment and reverses its effect on
    /// the due atomically, same retry protocol as `post_payment`
    pub async fn post_void(&self, payment: &Payment) -> Result<Due, DuesError> {
        let mut conflict: Option<DuesError> = None;
        for attempt in 0..2 {
            let mut due = self.due(payment.due_id).await?;
            due.reverse_payment(payment.amount)?;
            match self.payments.update_with_due(payment, &due).await {
                Ok(stored) => return Ok(stored),
                Err(error) if error.is_concurrency_conflict() => {
                    tracing::debug!(due_id = %due.id, attempt, "due version moved, retrying");
                    conflict = Some(error.into());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Err(conflict.unwrap_or_else(|| {
            DuesError::ConcurrencyConflict("due update retry exhausted".into())
        }))
    }

    /// Marks every due past the tolerance window as overdue
    ///
    /// One bulk write; already overdue dues are untouched, so running the
    /// sweep twice changes nothing the second time.
    pub async fn sweep_overdue(&self) -> Result<u64, DuesError> {
        let cutoff = self.overdue_cutoff().await?;
        let updated = self.dues.mark_overdue(cutoff).await?;
        tracing::info!(updated, %cutoff, "overdue sweep complete");
        Ok(updated)
    }

    /// Unpaid dues past the tolerance window, oldest deadline first
    ///
    /// Computed from dates, not the stored status, so the listing is
    /// accurate even before the next sweep runs.
    pub async fn list_overdue(&self) -> Result<Vec<Due>, DuesError> {
        let cutoff = self.overdue_cutoff().await?;
        Ok(self.dues.past_tolerance(cutoff).await?)
    }

    /// Collection summary for one billing month
    pub async fn period_summary(&self, period: BillingPeriod) -> Result<PeriodSummary, DuesError> {
        let dues = self.dues.for_period(period).await?;
        Ok(PeriodSummary::from_dues(period, &dues, today()))
    }

    /// Moves a due's payment deadline
    pub async fn reschedule(&self, id: DueId, due_date: NaiveDate) -> Result<Due, DuesError> {
        let mut conflict: Option<DuesError> = None;
        for attempt in 0..2 {
            let mut due = self.due(id).await?;
            due.reschedule(due_date);
            match self.dues.update(&due).await {
                Ok(stored) => return Ok(stored),
                Err(error) if error.is_concurrency_conflict() => {
                    tracing::debug!(due_id = %id, attempt, "due version moved, retrying");
                    conflict = Some(error.into());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Err(conflict.unwrap_or_else(|| {
            DuesError::ConcurrencyConflict("due update retry exhausted".into())
        }))
    }

    /// Deletes a due that has no payment history
    pub async fn delete_due(&self, id: DueId) -> Result<(), DuesError> {
        let due = self.due(id).await?;
        let payment_count = self.payments.count_for_due(id).await?;
        due.ensure_deletable(payment_count)?;
        self.dues.delete(id).await?;
        tracing::info!(due_id = %id, "due deleted");
        Ok(())
    }

    /// Total remaining balance in one currency, summed over dues
    pub fn total_outstanding(dues: &[Due]) -> Money {
        let currency = dues
            .first()
            .map(|due| due.balance.currency())
            .unwrap_or(Currency::COP);
        dues.iter()
            .fold(Money::zero(currency), |acc, due| acc + due.balance)
    }

    async fn overdue_cutoff(&self) -> Result<NaiveDate, DuesError> {
        let tolerance = settings::tolerance_days(self.config.as_ref()).await?;
        Ok(today() - Duration::days(tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PlayerId;
    use rust_decimal_macros::dec;

    fn cop(amount: Decimal) -> Money {
        Money::new(amount, Currency::COP)
    }

    fn due_with(
        amount: Decimal,
        paid: Decimal,
        due_date: NaiveDate,
    ) -> Due {
        let mut due = Due::new(
            PlayerId::new(),
            BillingPeriod::new(3, 2026).unwrap(),
            cop(amount),
            due_date,
        );
        if paid > Decimal::ZERO {
            due.apply_payment(cop(paid)).unwrap();
        }
        due
    }

    #[test]
    fn test_summary_buckets_split_on_deadline() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        let before = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
        let period = BillingPeriod::new(3, 2026).unwrap();

        let dues = vec![
            due_with(dec!(50000), dec!(50000), before), // paid, deadline irrelevant
            due_with(dec!(50000), dec!(0), before),     // past due
            due_with(dec!(50000), dec!(20000), before), // past due despite partial
            due_with(dec!(50000), dec!(0), after),      // pending on time
            due_with(dec!(50000), dec!(10000), after),  // partial on time
        ];

        let summary = PeriodSummary::from_dues(period, &dues, today);
        assert_eq!(summary.total_dues, 5);
        assert_eq!(summary.paid, 1);
        assert_eq!(summary.past_due, 2);
        assert_eq!(summary.pending_on_time, 1);
        assert_eq!(summary.partial_on_time, 1);
        assert_eq!(summary.expected, cop(dec!(250000)));
        assert_eq!(summary.collected, cop(dec!(80000)));
        assert_eq!(summary.outstanding, cop(dec!(170000)));
        // 80000/250000 = 32%, 1/5 = 20%
        assert_eq!(summary.percent_collected, dec!(32));
        assert_eq!(summary.percent_compliance, dec!(20));
    }

    #[test]
    fn test_summary_counts_rescheduled_overdue_due_as_on_time() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        let future = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
        let period = BillingPeriod::new(3, 2026).unwrap();

        // swept overdue, then the deadline was moved into the future
        let mut untouched = due_with(dec!(50000), dec!(0), future);
        untouched.status = DueStatus::Overdue;
        let mut part_paid = due_with(dec!(50000), dec!(20000), future);
        part_paid.status = DueStatus::Overdue;

        let summary = PeriodSummary::from_dues(period, &[untouched, part_paid], today);
        assert_eq!(summary.past_due, 0);
        assert_eq!(summary.pending_on_time, 1);
        assert_eq!(summary.partial_on_time, 1);
        assert_eq!(
            summary.paid + summary.pending_on_time + summary.partial_on_time + summary.past_due,
            summary.total_dues
        );
    }

    #[test]
    fn test_summary_of_empty_month_is_all_zero() {
        let period = BillingPeriod::new(7, 2026).unwrap();
        let summary = PeriodSummary::from_dues(period, &[], today());
        assert_eq!(summary.total_dues, 0);
        assert!(summary.expected.is_zero());
        assert_eq!(summary.percent_collected, Decimal::ZERO);
        assert_eq!(summary.percent_compliance, Decimal::ZERO);
    }

    #[test]
    fn test_percent_rounds_to_whole() {
        assert_eq!(round_percent(dec!(66.666)), dec!(67));
        assert_eq!(round_percent(dec!(33.333)), dec!(33));
        assert_eq!(round_percent(dec!(50.5)), dec!(51));
    }

    #[test]
    fn test_total_outstanding_sums_balances() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let dues = vec![
            due_with(dec!(50000), dec!(30000), date),
            due_with(dec!(40000), dec!(0), date),
        ];
        assert_eq!(DueLedger::total_outstanding(&dues), cop(dec!(60000)));
        assert!(DueLedger::total_outstanding(&[]).is_zero());
    }
}
