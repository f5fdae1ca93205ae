//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults, so
//! tests only spell out the fields they care about.

use chrono::NaiveDate;
use core_kernel::{BillingPeriod, CategoryId, Money, PlayerId};
use domain_dues::Due;
use domain_roster::{Category, Player};

use crate::fixtures::MoneyFixtures;

/// Builder for roster players
pub struct PlayerBuilder {
    id: PlayerId,
    first_name: String,
    last_name: String,
    document: String,
    birth_date: NaiveDate,
    category: Category,
    is_active: bool,
}

impl Default for PlayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerBuilder {
    /// A new active player in a standard-fee category
    pub fn new() -> Self {
        let id = PlayerId::new();
        Self {
            id,
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            // distinct per player, uniqueness is on the document column
            document: format!("DOC-{}", id.as_uuid().simple()),
            birth_date: NaiveDate::from_ymd_opt(2011, 6, 15).unwrap(),
            category: Category::new(
                CategoryId::new(),
                "Sub-15",
                MoneyFixtures::standard_fee(),
            ),
            is_active: true,
        }
    }

    pub fn with_id(mut self, id: PlayerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = name.into();
        self
    }

    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = name.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Shorthand: a fresh category with the given name and fee
    pub fn in_category(mut self, name: impl Into<String>, fee: Money) -> Self {
        self.category = Category::new(CategoryId::new(), name, fee);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> Player {
        Player {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            document: self.document,
            birth_date: self.birth_date,
            phone: None,
            email: None,
            category: self.category,
            is_active: self.is_active,
        }
    }
}

/// Builder for dues seeded directly into storage
pub struct DueBuilder {
    player_id: PlayerId,
    period: BillingPeriod,
    amount: Money,
    due_date: NaiveDate,
}

impl Default for DueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DueBuilder {
    pub fn new() -> Self {
        Self {
            player_id: PlayerId::new(),
            period: BillingPeriod::new(3, 2026).unwrap(),
            amount: MoneyFixtures::standard_fee(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        }
    }

    pub fn for_player(mut self, player_id: PlayerId) -> Self {
        self.player_id = player_id;
        self
    }

    pub fn in_period(mut self, period: BillingPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn build(self) -> Due {
        Due::new(self.player_id, self.period, self.amount, self.due_date)
    }
}
