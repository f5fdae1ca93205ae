//! Dues domain errors

use core_kernel::{AttachmentId, DueId, Money, MoneyError, PaymentId, PortError};
use thiserror::Error;

/// Coarse classification used by outer layers to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced entity does not exist
    NotFound,
    /// The operation clashes with existing state (duplicates, guards)
    Conflict,
    /// The request itself is invalid
    InvalidOperation,
    /// Concurrent writers raced and the retry budget is exhausted
    ConcurrencyConflict,
    /// Storage or other infrastructure failure
    Internal,
}

/// Errors raised by the dues domain services
#[derive(Debug, Error)]
pub enum DuesError {
    /// Due not found
    #[error("Due not found: {0}")]
    DueNotFound(DueId),

    /// Payment not found
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Receipt attachment not found
    #[error("Receipt attachment not found: {0}")]
    AttachmentNotFound(AttachmentId),

    /// Configuration key not found
    #[error("Configuration key not found: {0}")]
    ConfigKeyNotFound(String),

    /// Payment attempted against a fully settled due
    #[error("Due {0} is already fully paid")]
    AlreadySettled(DueId),

    /// Payment larger than the remaining balance
    #[error("Payment of {requested} exceeds the remaining balance of {available}")]
    ExceedsBalance {
        /// Amount the caller tried to pay
        requested: Money,
        /// Remaining balance on the due
        available: Money,
    },

    /// Void attempted on an already voided payment
    #[error("Payment {0} is already voided")]
    AlreadyVoided(PaymentId),

    /// Generation requested with no active players on the roster
    #[error("No active players to generate dues for")]
    NoActivePlayers,

    /// Request rejected by a domain rule
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// State clash reported by storage (duplicate due, duplicate receipt)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Optimistic version check failed after retrying
    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),

    /// Monetary arithmetic failure
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Storage failure
    #[error(transparent)]
    Storage(PortError),
}

impl DuesError {
    /// Rejects a request with a domain-rule message
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Classification for boundary mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DueNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::AttachmentNotFound(_)
            | Self::ConfigKeyNotFound(_) => ErrorKind::NotFound,
            Self::AlreadySettled(_) | Self::AlreadyVoided(_) | Self::Conflict(_) => {
                ErrorKind::Conflict
            }
            Self::ExceedsBalance { .. }
            | Self::NoActivePlayers
            | Self::InvalidOperation(_)
            | Self::Money(_) => ErrorKind::InvalidOperation,
            Self::ConcurrencyConflict(_) => ErrorKind::ConcurrencyConflict,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<PortError> for DuesError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Conflict { message } => Self::Conflict(message),
            PortError::ConcurrencyConflict { message } => Self::ConcurrencyConflict(message),
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            DuesError::DueNotFound(DueId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DuesError::AlreadySettled(DueId::new()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DuesError::invalid("bad request").kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(
            DuesError::ConcurrencyConflict("version mismatch".into()).kind(),
            ErrorKind::ConcurrencyConflict
        );
    }

    #[test]
    fn test_port_conflicts_map_to_domain_conflicts() {
        let error: DuesError = PortError::conflict("duplicate receipt number").into();
        assert_eq!(error.kind(), ErrorKind::Conflict);

        let error: DuesError = PortError::concurrency("stale version").into();
        assert_eq!(error.kind(), ErrorKind::ConcurrencyConflict);

        let error: DuesError = PortError::internal("io failure").into();
        assert_eq!(error.kind(), ErrorKind::Internal);
    }
}
