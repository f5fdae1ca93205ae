//! Payment repository implementation
//!
//! PostgreSQL adapter for payments. The combined write operations persist
//! the payment row and the reconciled due in one transaction, running the
//! due update under the same version check as the due repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{Currency, DueId, Money, PaymentId, PlayerId, PortError, UserId};
use domain_dues::{Due, Payment, PaymentFilter, PaymentMethod, PaymentStore, ReceiptNumber};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{map_sqlx, DatabaseError};
use crate::repositories::dues::update_due_versioned;

const SELECT_PAYMENT: &str = "SELECT p.id, p.due_id, p.player_id, p.amount, p.currency, \
     p.method, p.receipt_number, p.notes, p.voided, p.voided_at, p.void_reason, \
     p.recorded_by, p.paid_at FROM payments p";

/// Raw payments row as stored
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    due_id: Uuid,
    player_id: Uuid,
    amount: Decimal,
    currency: String,
    method: String,
    receipt_number: String,
    notes: Option<String>,
    voided: bool,
    voided_at: Option<DateTime<Utc>>,
    void_reason: Option<String>,
    recorded_by: Uuid,
    paid_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency
            .trim()
            .parse()
            .map_err(|_| DatabaseError::corrupt("currency", &row.currency))?;
        let method: PaymentMethod = row
            .method
            .parse()
            .map_err(|_| DatabaseError::corrupt("method", &row.method))?;
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            due_id: DueId::from_uuid(row.due_id),
            player_id: PlayerId::from_uuid(row.player_id),
            amount: Money::new(row.amount, currency),
            method,
            receipt_number: ReceiptNumber::from_raw(row.receipt_number),
            notes: row.notes,
            voided: row.voided,
            voided_at: row.voided_at,
            void_reason: row.void_reason,
            recorded_by: UserId::from_uuid(row.recorded_by),
            paid_at: row.paid_at,
        })
    }
}

/// Repository for payments
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn stale_version(due: &Due) -> PortError {
        PortError::concurrency(format!(
            "due {} version moved past {}",
            due.id, due.version
        ))
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn insert_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query(
            "INSERT INTO payments (id, due_id, player_id, amount, currency, method, \
             receipt_number, notes, voided, voided_at, void_reason, recorded_by, paid_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.due_id))
        .bind(Uuid::from(payment.player_id))
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(payment.method.as_str())
        .bind(payment.receipt_number.as_str())
        .bind(payment.notes.as_deref())
        .bind(payment.voided)
        .bind(payment.voided_at)
        .bind(payment.void_reason.as_deref())
        .bind(Uuid::from(payment.recorded_by))
        .bind(payment.paid_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let row = update_due_versioned(&mut *tx, due)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| Self::stale_version(due))?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(Due::try_from(row).map_err(PortError::from)?)
    }

    async fn update_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let result = sqlx::query(
            "UPDATE payments SET voided = $1, voided_at = $2, void_reason = $3 WHERE id = $4",
        )
        .bind(payment.voided)
        .bind(payment.voided_at)
        .bind(payment.void_reason.as_deref())
        .bind(Uuid::from(payment.id))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Payment", payment.id));
        }

        let row = update_due_versioned(&mut *tx, due)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| Self::stale_version(due))?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(Due::try_from(row).map_err(PortError::from)?)
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, PortError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{SELECT_PAYMENT} WHERE p.id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        row.map(|row| Payment::try_from(row).map_err(PortError::from))
            .transpose()
    }

    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, PortError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "{SELECT_PAYMENT} \
             JOIN dues d ON d.id = p.due_id \
             WHERE ($1 OR NOT p.voided) \
             AND ($2::uuid IS NULL OR p.player_id = $2) \
             AND ($3::text IS NULL OR p.method = $3) \
             AND ($4::date IS NULL OR p.paid_at::date >= $4) \
             AND ($5::date IS NULL OR p.paid_at::date <= $5) \
             AND ($6::integer IS NULL OR (d.month = $6 AND d.year = $7)) \
             ORDER BY p.paid_at DESC"
        ))
        .bind(filter.include_voided)
        .bind(filter.player_id.map(Uuid::from))
        .bind(filter.method.map(|m| m.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.due_period.map(|p| p.month() as i32))
        .bind(filter.due_period.map(|p| p.year()).unwrap_or_default())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.into_iter()
            .map(|row| Payment::try_from(row).map_err(PortError::from))
            .collect()
    }

    async fn for_due(&self, due_id: DueId) -> Result<Vec<Payment>, PortError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "{SELECT_PAYMENT} WHERE p.due_id = $1 ORDER BY p.paid_at ASC"
        ))
        .bind(Uuid::from(due_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.into_iter()
            .map(|row| Payment::try_from(row).map_err(PortError::from))
            .collect()
    }

    async fn count_for_due(&self, due_id: DueId) -> Result<u64, PortError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE due_id = $1")
            .bind(Uuid::from(due_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }
}
