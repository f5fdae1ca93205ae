//! Player read models

use chrono::NaiveDate;
use core_kernel::{CategoryId, Money, PlayerId};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A club member as the dues core sees them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier
    pub id: PlayerId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Identity document number (unique within the club)
    pub document: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Owning category
    pub category: Category,
    /// Whether the player is currently enrolled
    pub is_active: bool,
}

impl Player {
    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Projection of an active player used by due generation
///
/// Generation only needs the identity and the category's fixed fee; the
/// directory returns this slim view rather than the whole player record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePlayer {
    /// Player identifier
    pub player_id: PlayerId,
    /// Display name for reports
    pub full_name: String,
    /// Owning category identifier
    pub category_id: CategoryId,
    /// Category display name
    pub category_name: String,
    /// The category's fixed monthly due amount
    pub monthly_fee: Money,
}

impl From<&Player> for ActivePlayer {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id,
            full_name: player.full_name(),
            category_id: player.category.id,
            category_name: player.category.name.clone(),
            monthly_fee: player.category.monthly_fee,
        }
    }
}
