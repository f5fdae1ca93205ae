//! Receipt attachments
//!
//! Scanned receipts or transfer screenshots stored alongside a payment.
//! Content travels base64-encoded; type and size limits are enforced at the
//! HTTP boundary before anything reaches this module.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use core_kernel::{AttachmentId, PaymentId};
use serde::{Deserialize, Serialize};

/// Content types accepted for receipt uploads
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// Maximum accepted upload size in bytes (5 MiB)
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// True when the content type is accepted for receipt uploads
pub fn mime_type_allowed(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// A stored receipt file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptAttachment {
    /// Unique identifier
    pub id: AttachmentId,
    /// Payment this receipt documents
    pub payment_id: PaymentId,
    /// Original file name
    pub filename: String,
    /// Content type of the file
    pub mime_type: String,
    /// Decoded size in bytes
    pub size_bytes: i64,
    /// File content, base64 encoded
    pub content_base64: String,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl ReceiptAttachment {
    /// Encodes raw file bytes into a stored attachment
    pub fn from_bytes(
        payment_id: PaymentId,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self {
            id: AttachmentId::new(),
            payment_id,
            filename: filename.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as i64,
            content_base64: BASE64.encode(bytes),
            uploaded_at: Utc::now(),
        }
    }

    /// Decodes the stored content back to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.content_base64)
    }
}

/// Attachment listing entry without the content payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    /// Attachment identifier
    pub id: AttachmentId,
    /// Payment this receipt documents
    pub payment_id: PaymentId,
    /// Original file name
    pub filename: String,
    /// Content type of the file
    pub mime_type: String,
    /// Decoded size in bytes
    pub size_bytes: i64,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl From<&ReceiptAttachment> for AttachmentMetadata {
    fn from(attachment: &ReceiptAttachment) -> Self {
        Self {
            id: attachment.id,
            payment_id: attachment.payment_id,
            filename: attachment.filename.clone(),
            mime_type: attachment.mime_type.clone(),
            size_bytes: attachment.size_bytes,
            uploaded_at: attachment.uploaded_at,
        }
    }
}
