//! Player categories
//!
//! A category groups players by age bracket and fixes the monthly due
//! amount for everyone in the group.

use core_kernel::{CategoryId, Money};
use serde::{Deserialize, Serialize};

/// A player category with its fixed monthly fee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Display name (e.g., "Sub-15")
    pub name: String,
    /// Fixed monthly due amount for players in this category
    pub monthly_fee: Money,
    /// Minimum age for membership
    pub min_age: Option<u8>,
    /// Maximum age for membership
    pub max_age: Option<u8>,
    /// Free-form description
    pub description: Option<String>,
    /// Whether the category is open for enrollment
    pub is_active: bool,
}

impl Category {
    /// Creates an active category with the given name and fee
    pub fn new(id: CategoryId, name: impl Into<String>, monthly_fee: Money) -> Self {
        Self {
            id,
            name: name.into(),
            monthly_fee,
            min_age: None,
            max_age: None,
            description: None,
            is_active: true,
        }
    }

    /// Sets the age bracket
    pub fn with_age_bracket(mut self, min_age: u8, max_age: u8) -> Self {
        self.min_age = Some(min_age);
        self.max_age = Some(max_age);
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
