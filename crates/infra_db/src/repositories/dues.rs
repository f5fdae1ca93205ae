//! Due repository implementation
//!
//! PostgreSQL adapter for monthly dues. Updates run under the optimistic
//! version protocol: the WHERE clause names the version the caller read,
//! and zero affected rows is reported as a stale version.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillingPeriod, Currency, DueId, Money, PlayerId, PortError};
use domain_dues::{Due, DueFilter, DueStatus, DueStore};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{map_sqlx, DatabaseError};

const SELECT_DUE: &str = "SELECT id, player_id, month, year, amount, amount_paid, balance, \
     currency, due_date, status, created_at, version FROM dues";

/// Raw dues row as stored
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DueRow {
    pub id: Uuid,
    pub player_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl TryFrom<DueRow> for Due {
    type Error = DatabaseError;

    fn try_from(row: DueRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency
            .trim()
            .parse()
            .map_err(|_| DatabaseError::corrupt("currency", &row.currency))?;
        let status: DueStatus = row
            .status
            .parse()
            .map_err(|_| DatabaseError::corrupt("status", &row.status))?;
        let period = BillingPeriod::new(row.month as u32, row.year)
            .map_err(|_| DatabaseError::corrupt("month", row.month))?;
        Ok(Due {
            id: DueId::from_uuid(row.id),
            player_id: PlayerId::from_uuid(row.player_id),
            period,
            amount: Money::new(row.amount, currency),
            amount_paid: Money::new(row.amount_paid, currency),
            balance: Money::new(row.balance, currency),
            due_date: row.due_date,
            status,
            created_at: row.created_at,
            version: row.version,
        })
    }
}

/// Versioned due update against any executor, so the payment repository can
/// run it inside its transactions
///
/// Returns the stored row with the bumped version, or `None` when the
/// version check found no matching row.
pub(crate) async fn update_due_versioned<'e, E>(
    executor: E,
    due: &Due,
) -> Result<Option<DueRow>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_as(
        "UPDATE dues SET amount_paid = $1, balance = $2, due_date = $3, status = $4, \
         version = version + 1 \
         WHERE id = $5 AND version = $6 \
         RETURNING id, player_id, month, year, amount, amount_paid, balance, currency, \
         due_date, status, created_at, version",
    )
    .bind(due.amount_paid.amount())
    .bind(due.balance.amount())
    .bind(due.due_date)
    .bind(due.status.as_str())
    .bind(Uuid::from(due.id))
    .bind(due.version)
    .fetch_optional(executor)
    .await
}

/// Repository for monthly dues
#[derive(Debug, Clone)]
pub struct DueRepository {
    pool: PgPool,
}

impl DueRepository {
    /// Creates a new DueRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn rows_to_dues(rows: Vec<DueRow>) -> Result<Vec<Due>, PortError> {
        rows.into_iter()
            .map(|row| Due::try_from(row).map_err(PortError::from))
            .collect()
    }
}

#[async_trait]
impl DueStore for DueRepository {
    async fn insert(&self, due: &Due) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO dues (id, player_id, month, year, amount, amount_paid, balance, \
             currency, due_date, status, created_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(Uuid::from(due.id))
        .bind(Uuid::from(due.player_id))
        .bind(due.period.month() as i32)
        .bind(due.period.year())
        .bind(due.amount.amount())
        .bind(due.amount_paid.amount())
        .bind(due.balance.amount())
        .bind(due.amount.currency().code())
        .bind(due.due_date)
        .bind(due.status.as_str())
        .bind(due.created_at)
        .bind(due.version)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find(&self, id: DueId) -> Result<Option<Due>, PortError> {
        let row: Option<DueRow> =
            sqlx::query_as(&format!("{SELECT_DUE} WHERE id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        row.map(|row| Due::try_from(row).map_err(PortError::from))
            .transpose()
    }

    async fn update(&self, due: &Due) -> Result<Due, PortError> {
        let row = update_due_versioned(&self.pool, due)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => Ok(Due::try_from(row).map_err(PortError::from)?),
            None => {
                // distinguish a vanished row from a lost version race
                if self.find(due.id).await?.is_some() {
                    Err(PortError::concurrency(format!(
                        "due {} version moved past {}",
                        due.id, due.version
                    )))
                } else {
                    Err(PortError::not_found("Due", due.id))
                }
            }
        }
    }

    async fn delete(&self, id: DueId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM dues WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Due", id));
        }
        Ok(())
    }

    async fn list(&self, filter: &DueFilter) -> Result<Vec<Due>, PortError> {
        let rows: Vec<DueRow> = sqlx::query_as(&format!(
            "{SELECT_DUE} \
             WHERE ($1::uuid IS NULL OR player_id = $1) \
             AND ($2::integer IS NULL OR (month = $2 AND year = $3)) \
             AND ($4::text IS NULL OR status = $4) \
             ORDER BY year DESC, month DESC, created_at DESC"
        ))
        .bind(filter.player_id.map(Uuid::from))
        .bind(filter.period.map(|p| p.month() as i32))
        .bind(filter.period.map(|p| p.year()).unwrap_or_default())
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Self::rows_to_dues(rows)
    }

    async fn for_period(&self, period: BillingPeriod) -> Result<Vec<Due>, PortError> {
        self.list(&DueFilter {
            period: Some(period),
            ..Default::default()
        })
        .await
    }

    async fn for_player(&self, player_id: PlayerId) -> Result<Vec<Due>, PortError> {
        self.list(&DueFilter {
            player_id: Some(player_id),
            ..Default::default()
        })
        .await
    }

    async fn past_tolerance(&self, cutoff: NaiveDate) -> Result<Vec<Due>, PortError> {
        let rows: Vec<DueRow> = sqlx::query_as(&format!(
            "{SELECT_DUE} \
             WHERE status IN ('pending', 'partial') AND due_date < $1 \
             ORDER BY due_date ASC"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Self::rows_to_dues(rows)
    }

    async fn mark_overdue(&self, cutoff: NaiveDate) -> Result<u64, PortError> {
        let result = sqlx::query(
            "UPDATE dues SET status = 'overdue', version = version + 1 \
             WHERE status IN ('pending', 'partial') AND due_date < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn with_outstanding_debt(&self, today: NaiveDate) -> Result<Vec<Due>, PortError> {
        let rows: Vec<DueRow> = sqlx::query_as(&format!(
            "{SELECT_DUE} \
             WHERE balance > 0 \
             AND (status IN ('overdue', 'partial') OR (status = 'pending' AND due_date < $1)) \
             ORDER BY due_date ASC"
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Self::rows_to_dues(rows)
    }
}
