//! Test Fixtures
//!
//! Pre-built test data and a fully wired service set running over the
//! in-memory adapters.

use std::sync::Arc;

use core_kernel::{Currency, Money, UserId};
use domain_dues::{
    ConfigEntry, ConfigValueType, DueGenerator, DueLedger, PaymentRecorder, ReportingEngine,
    TOLERANCE_DAYS_KEY,
};
use domain_roster::{Player, PlayerDirectory};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::builders::PlayerBuilder;
use crate::memory::{
    MemoryAttachmentStore, MemoryConfigStore, MemoryDueStore, MemoryPaymentStore,
    MemoryPlayerDirectory,
};

/// Common monetary amounts in the club's currency
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// An amount in Colombian pesos
    pub fn cop(amount: Decimal) -> Money {
        Money::new(amount, Currency::COP)
    }

    /// The standard youth category fee
    pub fn standard_fee() -> Money {
        Self::cop(dec!(50000))
    }

    /// The senior category fee
    pub fn senior_fee() -> Money {
        Self::cop(dec!(80000))
    }
}

/// The whole dues stack wired over in-memory storage
///
/// Tests drive the real services; only persistence is substituted.
pub struct DuesWorld {
    pub dues: Arc<MemoryDueStore>,
    pub payments: Arc<MemoryPaymentStore>,
    pub config: Arc<MemoryConfigStore>,
    pub attachments: Arc<MemoryAttachmentStore>,
    pub directory: Arc<MemoryPlayerDirectory>,
    pub generator: DueGenerator,
    pub ledger: DueLedger,
    pub recorder: PaymentRecorder,
    pub reports: ReportingEngine,
    /// The user recording payments in tests
    pub treasurer: UserId,
}

impl DuesWorld {
    /// Wires an empty world
    pub fn new() -> Self {
        let dues = Arc::new(MemoryDueStore::new());
        let payments = Arc::new(MemoryPaymentStore::new(dues.clone()));
        let config = Arc::new(MemoryConfigStore::new());
        let attachments = Arc::new(MemoryAttachmentStore::new());
        let directory = Arc::new(MemoryPlayerDirectory::new());

        let generator = DueGenerator::new(dues.clone(), directory.clone() as Arc<dyn PlayerDirectory>);
        let ledger = DueLedger::new(dues.clone(), payments.clone(), config.clone());
        let recorder = PaymentRecorder::new(
            ledger.clone(),
            payments.clone(),
            attachments.clone(),
            config.clone(),
        );
        let reports = ReportingEngine::new(
            dues.clone(),
            payments.clone(),
            directory.clone() as Arc<dyn PlayerDirectory>,
        );

        Self {
            dues,
            payments,
            config,
            attachments,
            directory,
            generator,
            ledger,
            recorder,
            reports,
            treasurer: UserId::new(),
        }
    }

    /// Wires a world with `count` active players in the standard category
    pub fn with_players(count: usize) -> Self {
        let world = Self::new();
        for index in 0..count {
            world.directory.add(
                PlayerBuilder::new()
                    .with_first_name(format!("Player{index}"))
                    .build(),
            );
        }
        world
    }

    /// Adds a player and returns it
    pub fn add_player(&self, player: Player) -> Player {
        self.directory.add(player.clone());
        player
    }

    /// Seeds the tolerance configuration entry
    pub async fn set_tolerance_days(&self, days: i64) {
        use domain_dues::ConfigStore;
        let entry = ConfigEntry::new(
            TOLERANCE_DAYS_KEY,
            days.to_string(),
            ConfigValueType::Number,
        )
        .with_description("Grace days before a due is marked overdue");
        self.config.insert(&entry).await.unwrap();
    }
}

impl Default for DuesWorld {
    fn default() -> Self {
        Self::new()
    }
}
