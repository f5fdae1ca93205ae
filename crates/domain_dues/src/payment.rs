//! Payments and receipt numbers

use chrono::{DateTime, Utc};
use core_kernel::{DueId, Money, PaymentId, PlayerId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DuesError;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the club office
    Cash,
    /// Mobile wallet transfer
    MobileTransfer,
    /// Bank transfer
    BankTransfer,
    /// Anything else, described in the notes
    Other,
}

impl PaymentMethod {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MobileTransfer => "mobile_transfer",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "mobile_transfer" => Ok(PaymentMethod::MobileTransfer),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "other" => Ok(PaymentMethod::Other),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// A sequential receipt number, formatted `REC-000042`
///
/// Numbers come from the atomic counter in configuration storage and are
/// unique club-wide; voided payments keep theirs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptNumber(String);

impl ReceiptNumber {
    /// Formats a counter value as a receipt number
    pub fn from_sequence(sequence: i64) -> Self {
        Self(format!("REC-{sequence:06}"))
    }

    /// Wraps an already formatted number read back from storage
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The formatted number
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded payment against a due
///
/// Payments are append-only: a mistaken one is voided, never edited or
/// deleted, and the void is reflected back on the due by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Due this payment settles (fully or in part)
    pub due_id: DueId,
    /// Player the due belongs to, denormalized for reporting
    pub player_id: PlayerId,
    /// Amount paid
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// Club-wide unique receipt number
    pub receipt_number: ReceiptNumber,
    /// Free-form notes
    pub notes: Option<String>,
    /// Whether this payment has been voided
    pub voided: bool,
    /// When it was voided
    pub voided_at: Option<DateTime<Utc>>,
    /// Why it was voided
    pub void_reason: Option<String>,
    /// User who recorded the payment
    pub recorded_by: UserId,
    /// When the payment was taken
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a live payment recorded now
    pub fn new(
        due_id: DueId,
        player_id: PlayerId,
        amount: Money,
        method: PaymentMethod,
        receipt_number: ReceiptNumber,
        recorded_by: UserId,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            due_id,
            player_id,
            amount,
            method,
            receipt_number,
            notes: None,
            voided: false,
            voided_at: None,
            void_reason: None,
            recorded_by,
            paid_at: Utc::now(),
        }
    }

    /// Attaches free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Marks the payment voided with a reason
    ///
    /// One-way: a voided payment stays voided.
    pub fn void(&mut self, reason: impl Into<String>) -> Result<(), DuesError> {
        if self.voided {
            return Err(DuesError::AlreadyVoided(self.id));
        }
        self.voided = true;
        self.voided_at = Some(Utc::now());
        self.void_reason = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn sample_payment() -> Payment {
        Payment::new(
            DueId::new(),
            PlayerId::new(),
            Money::new(dec!(50000), Currency::COP),
            PaymentMethod::Cash,
            ReceiptNumber::from_sequence(7),
            UserId::new(),
        )
    }

    #[test]
    fn test_receipt_number_formatting() {
        assert_eq!(ReceiptNumber::from_sequence(1).as_str(), "REC-000001");
        assert_eq!(ReceiptNumber::from_sequence(42).as_str(), "REC-000042");
        assert_eq!(ReceiptNumber::from_sequence(123456).as_str(), "REC-123456");
        // numbers past six digits keep growing rather than wrapping
        assert_eq!(ReceiptNumber::from_sequence(1234567).as_str(), "REC-1234567");
    }

    #[test]
    fn test_void_is_one_way() {
        let mut payment = sample_payment();
        payment.void("duplicate entry").unwrap();
        assert!(payment.voided);
        assert!(payment.voided_at.is_some());
        assert_eq!(payment.void_reason.as_deref(), Some("duplicate entry"));

        let error = payment.void("again").unwrap_err();
        assert!(matches!(error, DuesError::AlreadyVoided(_)));
        assert_eq!(payment.void_reason.as_deref(), Some("duplicate entry"));
    }

    #[test]
    fn test_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::MobileTransfer,
            PaymentMethod::BankTransfer,
            PaymentMethod::Other,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
    }
}
