//! Attachment repository implementation
//!
//! PostgreSQL adapter for receipt attachments. Content is stored
//! base64-encoded in a text column, which keeps the rows dumpable and the
//! wire format identical to what the API serves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{AttachmentId, PaymentId, PortError};
use domain_dues::{AttachmentStore, ReceiptAttachment};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::map_sqlx;

const SELECT_ATTACHMENT: &str = "SELECT id, payment_id, filename, mime_type, size_bytes, \
     content_base64, uploaded_at FROM receipt_attachments";

/// Raw receipt_attachments row
#[derive(Debug, sqlx::FromRow)]
struct AttachmentRow {
    id: Uuid,
    payment_id: Uuid,
    filename: String,
    mime_type: String,
    size_bytes: i64,
    content_base64: String,
    uploaded_at: DateTime<Utc>,
}

impl From<AttachmentRow> for ReceiptAttachment {
    fn from(row: AttachmentRow) -> Self {
        ReceiptAttachment {
            id: AttachmentId::from_uuid(row.id),
            payment_id: PaymentId::from_uuid(row.payment_id),
            filename: row.filename,
            mime_type: row.mime_type,
            size_bytes: row.size_bytes,
            content_base64: row.content_base64,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Repository for receipt attachments
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Creates a new AttachmentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentStore for AttachmentRepository {
    async fn insert(&self, attachment: &ReceiptAttachment) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO receipt_attachments (id, payment_id, filename, mime_type, \
             size_bytes, content_base64, uploaded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::from(attachment.id))
        .bind(Uuid::from(attachment.payment_id))
        .bind(&attachment.filename)
        .bind(&attachment.mime_type)
        .bind(attachment.size_bytes)
        .bind(&attachment.content_base64)
        .bind(attachment.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find(&self, id: AttachmentId) -> Result<Option<ReceiptAttachment>, PortError> {
        let row: Option<AttachmentRow> =
            sqlx::query_as(&format!("{SELECT_ATTACHMENT} WHERE id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        Ok(row.map(ReceiptAttachment::from))
    }

    async fn for_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<ReceiptAttachment>, PortError> {
        let rows: Vec<AttachmentRow> = sqlx::query_as(&format!(
            "{SELECT_ATTACHMENT} WHERE payment_id = $1 ORDER BY uploaded_at ASC"
        ))
        .bind(Uuid::from(payment_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(ReceiptAttachment::from).collect())
    }
}
