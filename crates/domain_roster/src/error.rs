//! Roster domain errors

use core_kernel::{PlayerId, PortError};
use thiserror::Error;

/// Errors that can occur in the roster domain
#[derive(Debug, Error)]
pub enum RosterError {
    /// Player not found
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Storage failure
    #[error(transparent)]
    Storage(#[from] PortError),
}
