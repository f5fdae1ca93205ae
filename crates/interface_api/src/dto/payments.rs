//! Payment request/response types

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillingPeriod, Currency, DueId, Money, PaymentId, PlayerId, UserId};
use domain_dues::{NewPayment, Payment, PaymentFilter, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::dues::DueResponse;
use crate::error::ApiError;

/// Body for recording a payment
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub due_id: Uuid,
    pub amount: Decimal,
    /// ISO 4217 code; defaults to COP
    pub currency: Option<String>,
    pub method: PaymentMethod,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_new_payment(self) -> Result<NewPayment, ApiError> {
        let currency = match self.currency.as_deref() {
            Some(code) => code
                .parse::<Currency>()
                .map_err(|_| ApiError::BadRequest(format!("unknown currency '{code}'")))?,
            None => Currency::COP,
        };
        Ok(NewPayment {
            due_id: DueId::from_uuid(self.due_id),
            amount: Money::new(self.amount, currency),
            method: self.method,
            notes: self.notes,
        })
    }
}

/// A payment as served by the API
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub due_id: DueId,
    pub player_id: PlayerId,
    pub amount: Decimal,
    pub currency: String,
    pub method: PaymentMethod,
    pub receipt_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub voided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
    pub recorded_by: UserId,
    pub paid_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            due_id: payment.due_id,
            player_id: payment.player_id,
            amount: payment.amount.amount(),
            currency: payment.amount.currency().to_string(),
            method: payment.method,
            receipt_number: payment.receipt_number.as_str().to_string(),
            notes: payment.notes,
            voided: payment.voided,
            voided_at: payment.voided_at,
            void_reason: payment.void_reason,
            recorded_by: payment.recorded_by,
            paid_at: payment.paid_at,
        }
    }
}

/// Payment plus the due it settled, as returned by record and void
#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub payment: PaymentResponse,
    pub due: DueResponse,
}

/// Body for voiding a payment
#[derive(Debug, Deserialize, Validate)]
pub struct VoidPaymentRequest {
    #[validate(length(min = 3, max = 500))]
    pub reason: String,
}

/// Query parameters for listing payments
#[derive(Debug, Default, Deserialize)]
pub struct ListPaymentsQuery {
    pub player_id: Option<Uuid>,
    pub method: Option<PaymentMethod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub include_voided: Option<bool>,
}

impl ListPaymentsQuery {
    pub fn into_filter(self) -> Result<PaymentFilter, ApiError> {
        let due_period = match (self.month, self.year) {
            (Some(month), Some(year)) => Some(
                BillingPeriod::new(month, year)
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "month and year must be provided together".to_string(),
                ))
            }
        };
        Ok(PaymentFilter {
            player_id: self.player_id.map(PlayerId::from_uuid),
            method: self.method,
            from: self.from,
            to: self.to,
            due_period,
            include_voided: self.include_voided.unwrap_or(false),
        })
    }
}

/// Body for uploading a receipt file, content base64-encoded
#[derive(Debug, Deserialize, Validate)]
pub struct AttachmentUploadRequest {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,
    #[validate(length(min = 1))]
    pub content_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_defaults_to_cop() {
        let request = RecordPaymentRequest {
            due_id: Uuid::new_v4(),
            amount: dec!(50000),
            currency: None,
            method: PaymentMethod::Cash,
            notes: None,
        };
        let payment = request.into_new_payment().expect("new payment");
        assert_eq!(payment.amount.currency(), Currency::COP);
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let request = RecordPaymentRequest {
            due_id: Uuid::new_v4(),
            amount: dec!(10),
            currency: Some("GBP".to_string()),
            method: PaymentMethod::BankTransfer,
            notes: None,
        };
        assert!(request.into_new_payment().is_err());
    }

    #[test]
    fn voided_payments_are_excluded_by_default() {
        let filter = ListPaymentsQuery::default().into_filter().expect("filter");
        assert!(!filter.include_voided);
    }
}
