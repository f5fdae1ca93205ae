//! Port error type shared by all storage adapters
//!
//! Each domain defines its own port traits (DueStore, PaymentStore, ...);
//! every implementation - PostgreSQL in infra_db, in-memory in test_utils -
//! reports failures through this single error type so callers can classify
//! outcomes without knowing which adapter is behind the trait.

use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation conflicts with existing data (unique violation)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// A concurrent writer changed the row between read and write
    #[error("Concurrent modification: {message}")]
    ConcurrencyConflict {
        message: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Connection to the underlying store failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a ConcurrencyConflict error
    pub fn concurrency(message: impl Into<String>) -> Self {
        PortError::ConcurrencyConflict {
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error is a lost-update race that may succeed on retry
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, PortError::ConcurrencyConflict { .. })
    }

    /// Returns true if this error is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let error = PortError::not_found("Due", "DUE-123");
        assert!(error.is_not_found());
        assert!(!error.is_concurrency_conflict());
        assert!(error.to_string().contains("Due"));
        assert!(error.to_string().contains("DUE-123"));
    }

    #[test]
    fn test_concurrency_classification() {
        let error = PortError::concurrency("due version moved from 3");
        assert!(error.is_concurrency_conflict());
        assert!(!error.is_conflict());
    }

    #[test]
    fn test_conflict_classification() {
        let error = PortError::conflict("duplicate due for player/period");
        assert!(error.is_conflict());
        assert!(!error.is_not_found());
    }
}
