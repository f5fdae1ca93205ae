//! Financial reports
//!
//! Read-only aggregations over dues and payments: the cash report for the
//! treasurer, the arrears report for chasing debtors, income projection and
//! per-category compliance for a billing month, and the dashboard counters.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{today, BillingPeriod, Currency, DueId, Money, PaymentId, PlayerId};
use domain_roster::PlayerDirectory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::due::{Due, DueStatus};
use crate::error::DuesError;
use crate::ledger::round_percent;
use crate::payment::{Payment, PaymentMethod};
use crate::ports::{DueStore, PaymentFilter, PaymentStore};

/// How cash report rows are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashGrouping {
    /// One group per calendar day
    Day,
    /// One group per payment method
    Method,
}

/// Parameters for the cash report
///
/// A billing month, when given, wins over the date range; with neither the
/// report covers everything.
#[derive(Debug, Clone)]
pub struct CashQuery {
    /// Start of the date range (payment date)
    pub from: Option<NaiveDate>,
    /// End of the date range (payment date)
    pub to: Option<NaiveDate>,
    /// Billing month of the paid dues
    pub period: Option<BillingPeriod>,
    /// Row grouping
    pub group_by: CashGrouping,
}

/// Which filter the cash report actually applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CashScope {
    /// Filtered by the billing month of the paid dues
    Period { period: BillingPeriod },
    /// Filtered by payment date
    DateRange { from: NaiveDate, to: NaiveDate },
    /// No filter
    All,
}

/// One payment line inside a cash report group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLine {
    /// Payment identifier
    pub payment_id: PaymentId,
    /// Receipt number on the payment
    pub receipt_number: String,
    /// Player who paid
    pub player_id: PlayerId,
    /// Amount paid
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// When the payment was taken
    pub paid_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentLine {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id,
            receipt_number: payment.receipt_number.as_str().to_string(),
            player_id: payment.player_id,
            amount: payment.amount,
            method: payment.method,
            paid_at: payment.paid_at,
        }
    }
}

/// One group of the cash report (a day or a method)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashGroup {
    /// Group key: an ISO date or a payment method name
    pub key: String,
    /// Number of payments in the group
    pub count: u64,
    /// Sum of the group's payments
    pub total: Money,
    /// The payments themselves
    pub payments: Vec<PaymentLine>,
}

/// Cash collected, grouped by day or method
///
/// Voided payments never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashReport {
    /// Filter that was applied
    pub scope: CashScope,
    /// Row grouping used
    pub group_by: CashGrouping,
    /// Total number of payments
    pub total_payments: u64,
    /// Total collected across all groups
    pub total_collected: Money,
    /// The groups in key order
    pub groups: Vec<CashGroup>,
}

/// One unpaid due inside a debtor entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueDebt {
    /// Due identifier
    pub due_id: DueId,
    /// Billing month of the debt
    pub period: BillingPeriod,
    /// Deadline that was missed
    pub due_date: NaiveDate,
    /// What is still owed on this due
    pub balance: Money,
}

/// One player and everything they owe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtorEntry {
    /// Player identifier
    pub player_id: PlayerId,
    /// Display name
    pub player_name: String,
    /// Category display name
    pub category_name: String,
    /// The unpaid dues, oldest deadline first
    pub dues: Vec<DueDebt>,
    /// Sum of the balances
    pub total_debt: Money,
}

/// Players with outstanding debt, worst first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrearsReport {
    /// Number of players owing money
    pub total_debtors: u64,
    /// Club-wide outstanding debt
    pub total_debt: Money,
    /// One entry per debtor, ordered by total debt descending
    pub debtors: Vec<DebtorEntry>,
}

/// Expected versus collected for one billing month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeProjection {
    /// Billing month projected
    pub period: BillingPeriod,
    /// Sum of all due principals
    pub expected: Money,
    /// Sum of everything paid
    pub collected: Money,
    /// Sum of remaining balances
    pub outstanding: Money,
    /// collected / expected, whole percent
    pub percent_collection: Decimal,
    /// paid dues / total dues, whole percent
    pub percent_compliance: Decimal,
    /// Number of dues in the month
    pub total_dues: u64,
    /// Fully settled dues
    pub paid: u64,
    /// Untouched dues
    pub pending: u64,
    /// Partially paid dues
    pub partial: u64,
    /// Dues stamped overdue by the sweep
    pub overdue: u64,
}

/// Collection numbers for one category in one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCompliance {
    /// Category display name
    pub category_name: String,
    /// Dues billed to the category's players
    pub total_dues: u64,
    /// Fully settled dues
    pub paid: u64,
    /// Sum of the category's due principals
    pub expected: Money,
    /// Sum paid by the category's players
    pub collected: Money,
    /// collected / expected, whole percent
    pub percent_collection: Decimal,
}

/// Per-category compliance for one billing month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryComplianceReport {
    /// Billing month covered
    pub period: BillingPeriod,
    /// One row per category, ordered by name
    pub categories: Vec<CategoryCompliance>,
}

/// Dashboard counters for the current month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubStatistics {
    /// Players on the roster
    pub players_total: u64,
    /// Currently active players
    pub players_active: u64,
    /// Inactive players
    pub players_inactive: u64,
    /// The month the due counters cover
    pub period: BillingPeriod,
    /// Dues billed this month
    pub dues_total: u64,
    /// Fully settled dues this month
    pub paid: u64,
    /// Pending or partial dues this month
    pub pending: u64,
    /// Dues stamped overdue this month
    pub overdue: u64,
    /// Cash collected on this month's dues
    pub collected: Money,
}

/// Read-only reporting over dues, payments, and the roster
#[derive(Clone)]
pub struct ReportingEngine {
    dues: Arc<dyn DueStore>,
    payments: Arc<dyn PaymentStore>,
    directory: Arc<dyn PlayerDirectory>,
}

impl ReportingEngine {
    pub fn new(
        dues: Arc<dyn DueStore>,
        payments: Arc<dyn PaymentStore>,
        directory: Arc<dyn PlayerDirectory>,
    ) -> Self {
        Self {
            dues,
            payments,
            directory,
        }
    }

    /// Cash collected, grouped by day or payment method
    pub async fn cash_report(&self, query: CashQuery) -> Result<CashReport, DuesError> {
        let (filter, scope) = match (query.period, query.from, query.to) {
            (Some(period), _, _) => (
                PaymentFilter {
                    due_period: Some(period),
                    ..Default::default()
                },
                CashScope::Period { period },
            ),
            (None, Some(from), Some(to)) => (
                PaymentFilter {
                    from: Some(from),
                    to: Some(to),
                    ..Default::default()
                },
                CashScope::DateRange { from, to },
            ),
            _ => (PaymentFilter::default(), CashScope::All),
        };

        let payments = self.payments.list(&filter).await?;
        let currency = payments
            .first()
            .map(|p| p.amount.currency())
            .unwrap_or_default();

        let mut grouped: BTreeMap<String, Vec<&Payment>> = BTreeMap::new();
        for payment in &payments {
            let key = match query.group_by {
                CashGrouping::Day => payment.paid_at.date_naive().to_string(),
                CashGrouping::Method => payment.method.as_str().to_string(),
            };
            grouped.entry(key).or_default().push(payment);
        }

        let mut total_collected = Money::zero(currency);
        let mut groups = Vec::with_capacity(grouped.len());
        for (key, members) in grouped {
            let total = members
                .iter()
                .fold(Money::zero(currency), |acc, p| acc + p.amount);
            total_collected = total_collected + total;
            groups.push(CashGroup {
                key,
                count: members.len() as u64,
                total,
                payments: members.into_iter().map(PaymentLine::from).collect(),
            });
        }

        Ok(CashReport {
            scope,
            group_by: query.group_by,
            total_payments: payments.len() as u64,
            total_collected,
            groups,
        })
    }

    /// Players with outstanding debt, ordered worst first
    ///
    /// A due counts as debt when it is overdue or partial, or pending and
    /// already past its calendar deadline, and it still carries a balance.
    pub async fn arrears_report(&self) -> Result<ArrearsReport, DuesError> {
        let dues = self.dues.with_outstanding_debt(today()).await?;
        let currency = dues
            .first()
            .map(|due| due.balance.currency())
            .unwrap_or_default();

        let mut by_player: HashMap<PlayerId, Vec<&Due>> = HashMap::new();
        for due in dues.iter().filter(|due| due.balance.is_positive()) {
            by_player.entry(due.player_id).or_default().push(due);
        }

        let ids: Vec<PlayerId> = by_player.keys().copied().collect();
        let players = self.directory.find_many(&ids).await?;
        let names: HashMap<PlayerId, (String, String)> = players
            .iter()
            .map(|p| (p.id, (p.full_name(), p.category.name.clone())))
            .collect();

        let mut total_debt = Money::zero(currency);
        let mut debtors = Vec::with_capacity(by_player.len());
        for (player_id, mut player_dues) in by_player {
            player_dues.sort_by_key(|due| due.due_date);
            let debt = player_dues
                .iter()
                .fold(Money::zero(currency), |acc, due| acc + due.balance);
            total_debt = total_debt + debt;
            let (player_name, category_name) = names
                .get(&player_id)
                .cloned()
                .unwrap_or_else(|| ("(unknown player)".to_string(), String::new()));
            debtors.push(DebtorEntry {
                player_id,
                player_name,
                category_name,
                dues: player_dues
                    .iter()
                    .map(|due| DueDebt {
                        due_id: due.id,
                        period: due.period,
                        due_date: due.due_date,
                        balance: due.balance,
                    })
                    .collect(),
                total_debt: debt,
            });
        }
        debtors.sort_by(|a, b| b.total_debt.amount().cmp(&a.total_debt.amount()));

        Ok(ArrearsReport {
            total_debtors: debtors.len() as u64,
            total_debt,
            debtors,
        })
    }

    /// Expected versus collected for one billing month
    pub async fn income_projection(
        &self,
        period: BillingPeriod,
    ) -> Result<IncomeProjection, DuesError> {
        let dues = self.dues.for_period(period).await?;
        let currency = dues
            .first()
            .map(|due| due.amount.currency())
            .unwrap_or_default();

        let mut expected = Money::zero(currency);
        let mut collected = Money::zero(currency);
        let mut outstanding = Money::zero(currency);
        let (mut paid, mut pending, mut partial, mut overdue) = (0u64, 0u64, 0u64, 0u64);
        for due in &dues {
            expected = expected + due.amount;
            collected = collected + due.amount_paid;
            outstanding = outstanding + due.balance;
            match due.status {
                DueStatus::Paid => paid += 1,
                DueStatus::Pending => pending += 1,
                DueStatus::Partial => partial += 1,
                DueStatus::Overdue => overdue += 1,
            }
        }

        let total_dues = dues.len() as u64;
        let percent_compliance = if total_dues == 0 {
            Decimal::ZERO
        } else {
            round_percent(Decimal::from(paid) / Decimal::from(total_dues) * Decimal::ONE_HUNDRED)
        };

        Ok(IncomeProjection {
            period,
            expected,
            collected,
            outstanding,
            percent_collection: round_percent(collected.percentage_of(&expected)),
            percent_compliance,
            total_dues,
            paid,
            pending,
            partial,
            overdue,
        })
    }

    /// Per-category collection numbers for one billing month
    pub async fn compliance_by_category(
        &self,
        period: BillingPeriod,
    ) -> Result<CategoryComplianceReport, DuesError> {
        let dues = self.dues.for_period(period).await?;
        let ids: Vec<PlayerId> = dues.iter().map(|due| due.player_id).collect();
        let players = self.directory.find_many(&ids).await?;
        let categories: HashMap<PlayerId, String> = players
            .iter()
            .map(|p| (p.id, p.category.name.clone()))
            .collect();
        let currency = dues
            .first()
            .map(|due| due.amount.currency())
            .unwrap_or_default();

        struct Bucket {
            total_dues: u64,
            paid: u64,
            expected: Money,
            collected: Money,
        }
        let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
        for due in &dues {
            let Some(category) = categories.get(&due.player_id) else {
                tracing::warn!(player_id = %due.player_id, "due references unknown player, skipping");
                continue;
            };
            let bucket = buckets.entry(category.clone()).or_insert(Bucket {
                total_dues: 0,
                paid: 0,
                expected: Money::zero(currency),
                collected: Money::zero(currency),
            });
            bucket.total_dues += 1;
            if due.status == DueStatus::Paid {
                bucket.paid += 1;
            }
            bucket.expected = bucket.expected + due.amount;
            bucket.collected = bucket.collected + due.amount_paid;
        }

        Ok(CategoryComplianceReport {
            period,
            categories: buckets
                .into_iter()
                .map(|(category_name, bucket)| CategoryCompliance {
                    category_name,
                    total_dues: bucket.total_dues,
                    paid: bucket.paid,
                    percent_collection: round_percent(
                        bucket.collected.percentage_of(&bucket.expected),
                    ),
                    expected: bucket.expected,
                    collected: bucket.collected,
                })
                .collect(),
        })
    }

    /// Dashboard counters: roster totals plus the current month's dues
    pub async fn general_statistics(&self) -> Result<ClubStatistics, DuesError> {
        let players_total = self.directory.count_all().await?;
        let players_active = self.directory.count_active().await?;

        let period = BillingPeriod::current();
        let dues = self.dues.for_period(period).await?;
        let currency = dues
            .first()
            .map(|due| due.amount.currency())
            .unwrap_or_default();

        let mut collected = Money::zero(currency);
        let (mut paid, mut pending, mut overdue) = (0u64, 0u64, 0u64);
        for due in &dues {
            collected = collected + due.amount_paid;
            match due.status {
                DueStatus::Paid => paid += 1,
                DueStatus::Pending | DueStatus::Partial => pending += 1,
                DueStatus::Overdue => overdue += 1,
            }
        }

        Ok(ClubStatistics {
            players_total,
            players_active,
            players_inactive: players_total.saturating_sub(players_active),
            period,
            dues_total: dues.len() as u64,
            paid,
            pending,
            overdue,
            collected,
        })
    }
}
