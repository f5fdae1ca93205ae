//! Payment recording
//!
//! Front door for money movements: validates a payment request against its
//! due, draws the next receipt number from the atomic counter, and hands the
//! posting to the ledger. Also owns voiding and receipt attachments.

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{AttachmentId, Money, PaymentId, UserId};

use crate::attachment::{AttachmentMetadata, ReceiptAttachment};
use crate::due::Due;
use crate::error::DuesError;
use crate::ledger::DueLedger;
use crate::payment::{Payment, PaymentMethod, ReceiptNumber};
use crate::ports::{AttachmentStore, ConfigStore, PaymentFilter, PaymentStore};
use crate::settings::RECEIPT_COUNTER_KEY;

/// A payment request as it arrives from the boundary
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Due the payment settles
    pub due_id: core_kernel::DueId,
    /// Amount tendered
    pub amount: Money,
    /// How it was paid
    pub method: PaymentMethod,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Service that records and voids payments
#[derive(Clone)]
pub struct PaymentRecorder {
    ledger: DueLedger,
    payments: Arc<dyn PaymentStore>,
    attachments: Arc<dyn AttachmentStore>,
    config: Arc<dyn ConfigStore>,
}

impl PaymentRecorder {
    pub fn new(
        ledger: DueLedger,
        payments: Arc<dyn PaymentStore>,
        attachments: Arc<dyn AttachmentStore>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            ledger,
            payments,
            attachments,
            config,
        }
    }

    /// Records a payment against a due
    ///
    /// Rejects non-positive amounts and anything above the remaining
    /// balance before a receipt number is drawn; the ledger checks the
    /// balance again when it posts. The receipt number is drawn before
    /// posting; if the posting then fails the number is burned, which keeps
    /// the counter simple and the sequence unique.
    pub async fn record(
        &self,
        request: NewPayment,
        recorded_by: UserId,
    ) -> Result<(Payment, Due), DuesError> {
        if !request.amount.is_positive() {
            return Err(DuesError::invalid("payment amount must be positive"));
        }
        let due = self.ledger.due(request.due_id).await?;
        if request.amount > due.balance {
            return Err(DuesError::ExceedsBalance {
                requested: request.amount,
                available: due.balance,
            });
        }

        let sequence = self.config.increment_counter(RECEIPT_COUNTER_KEY).await?;
        let receipt_number = ReceiptNumber::from_sequence(sequence);
        let mut payment = Payment::new(
            due.id,
            due.player_id,
            request.amount,
            request.method,
            receipt_number,
            recorded_by,
        );
        if let Some(notes) = request.notes {
            payment = payment.with_notes(notes);
        }

        let due = self.ledger.post_payment(&payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            receipt = %payment.receipt_number,
            due_id = %due.id,
            amount = %payment.amount,
            "payment recorded"
        );
        Ok((payment, due))
    }

    /// Voids a payment and reverses its effect on the due
    pub async fn void(
        &self,
        payment_id: PaymentId,
        reason: impl Into<String>,
        acting_user: UserId,
    ) -> Result<(Payment, Due), DuesError> {
        let mut payment = self.payment(payment_id).await?;
        payment.void(reason.into())?;
        let due = self.ledger.post_void(&payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            receipt = %payment.receipt_number,
            voided_by = %acting_user,
            "payment voided"
        );
        Ok((payment, due))
    }

    /// Looks up a payment by id
    pub async fn payment(&self, id: PaymentId) -> Result<Payment, DuesError> {
        self.payments
            .find(id)
            .await?
            .ok_or(DuesError::PaymentNotFound(id))
    }

    /// Lists payments matching the filter
    pub async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DuesError> {
        Ok(self.payments.list(filter).await?)
    }

    /// Non-voided payments received on one calendar day
    pub async fn payments_on(&self, date: NaiveDate) -> Result<Vec<Payment>, DuesError> {
        self.list(&PaymentFilter {
            from: Some(date),
            to: Some(date),
            ..PaymentFilter::default()
        })
        .await
    }

    /// Non-voided payments made with one method
    pub async fn payments_by_method(
        &self,
        method: PaymentMethod,
    ) -> Result<Vec<Payment>, DuesError> {
        self.list(&PaymentFilter {
            method: Some(method),
            ..PaymentFilter::default()
        })
        .await
    }

    /// All payments recorded against one due, voided included
    pub async fn payments_for_due(
        &self,
        due_id: core_kernel::DueId,
    ) -> Result<Vec<Payment>, DuesError> {
        Ok(self.payments.for_due(due_id).await?)
    }

    /// Stores a receipt file for a payment and returns its metadata
    ///
    /// Content type and size are validated at the boundary before the raw
    /// bytes get here.
    pub async fn attach_receipt(
        &self,
        payment_id: PaymentId,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<AttachmentMetadata, DuesError> {
        let payment = self.payment(payment_id).await?;
        let attachment = ReceiptAttachment::from_bytes(payment.id, filename, mime_type, bytes);
        self.attachments.insert(&attachment).await?;
        tracing::info!(
            payment_id = %payment.id,
            attachment_id = %attachment.id,
            size_bytes = attachment.size_bytes,
            "receipt attached"
        );
        Ok(AttachmentMetadata::from(&attachment))
    }

    /// Fetches an attachment with its content for download
    pub async fn attachment(&self, id: AttachmentId) -> Result<ReceiptAttachment, DuesError> {
        self.attachments
            .find(id)
            .await?
            .ok_or(DuesError::AttachmentNotFound(id))
    }

    /// Lists the receipts attached to a payment, without content
    pub async fn attachments_for_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<AttachmentMetadata>, DuesError> {
        let rows = self.attachments.for_payment(payment_id).await?;
        Ok(rows.iter().map(AttachmentMetadata::from).collect())
    }
}
