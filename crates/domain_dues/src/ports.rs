//! Dues Domain Ports
//!
//! Storage traits the dues services depend on. Adapters live in infra_db
//! (PostgreSQL) and test_utils (in-memory); both enforce the same contracts:
//! unique (player, period) per due, unique receipt numbers, and optimistic
//! version checks on due updates.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{AttachmentId, BillingPeriod, DueId, PaymentId, PlayerId, PortError};

use crate::attachment::ReceiptAttachment;
use crate::due::{Due, DueStatus};
use crate::payment::{Payment, PaymentMethod};
use crate::settings::ConfigEntry;

/// Criteria for listing dues
#[derive(Debug, Clone, Default)]
pub struct DueFilter {
    /// Only dues for this player
    pub player_id: Option<PlayerId>,
    /// Only dues for this billing month
    pub period: Option<BillingPeriod>,
    /// Only dues in this state
    pub status: Option<DueStatus>,
}

/// Criteria for listing payments
///
/// When `due_period` is set it wins over the date range; voided payments
/// are excluded unless `include_voided` is set.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Only payments for this player
    pub player_id: Option<PlayerId>,
    /// Only payments made with this method
    pub method: Option<PaymentMethod>,
    /// Only payments taken on or after this date
    pub from: Option<NaiveDate>,
    /// Only payments taken on or before this date
    pub to: Option<NaiveDate>,
    /// Only payments whose due bills this month
    pub due_period: Option<BillingPeriod>,
    /// Include voided payments in the result
    pub include_voided: bool,
}

/// Persistence for monthly dues
///
/// `update` uses the version the caller read: the write succeeds only if the
/// stored row still carries `due.version`, and the returned due has the
/// bumped version. A mismatch is reported as `ConcurrencyConflict`.
#[async_trait]
pub trait DueStore: Send + Sync {
    /// Inserts a new due; `Conflict` when (player, period) already exists
    async fn insert(&self, due: &Due) -> Result<(), PortError>;

    /// Finds a due by id
    async fn find(&self, id: DueId) -> Result<Option<Due>, PortError>;

    /// Writes a modified due under the optimistic version check
    async fn update(&self, due: &Due) -> Result<Due, PortError>;

    /// Removes a due (ledger checks the no-payments guard first)
    async fn delete(&self, id: DueId) -> Result<(), PortError>;

    /// Lists dues matching the filter, newest period first
    async fn list(&self, filter: &DueFilter) -> Result<Vec<Due>, PortError>;

    /// All dues for one billing month
    async fn for_period(&self, period: BillingPeriod) -> Result<Vec<Due>, PortError>;

    /// All dues for one player, newest period first
    async fn for_player(&self, player_id: PlayerId) -> Result<Vec<Due>, PortError>;

    /// Pending or partial dues whose deadline is before the cutoff,
    /// oldest deadline first
    async fn past_tolerance(&self, cutoff: NaiveDate) -> Result<Vec<Due>, PortError>;

    /// Stamps every pending or partial due older than the cutoff as
    /// overdue in one bulk write; returns how many rows changed
    async fn mark_overdue(&self, cutoff: NaiveDate) -> Result<u64, PortError>;

    /// Dues that still carry debt for the arrears report: overdue or
    /// partial, plus pending ones already past their calendar deadline
    async fn with_outstanding_debt(&self, today: NaiveDate) -> Result<Vec<Due>, PortError>;
}

/// Persistence for payments
///
/// The two write operations also persist the reconciled due in the same
/// transaction, under the same version protocol as `DueStore::update`, so a
/// payment row and its due can never disagree.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a payment and updates its due atomically;
    /// `Conflict` on a duplicate receipt number
    async fn insert_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError>;

    /// Updates a payment (void fields) and its due atomically
    async fn update_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError>;

    /// Finds a payment by id
    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, PortError>;

    /// Lists payments matching the filter, newest first
    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, PortError>;

    /// All payments recorded against one due, voided included, oldest first
    async fn for_due(&self, due_id: DueId) -> Result<Vec<Payment>, PortError>;

    /// Number of payments recorded against one due, voided included
    async fn count_for_due(&self, due_id: DueId) -> Result<u64, PortError>;
}

/// Persistence for club configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads an entry by key
    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>, PortError>;

    /// Creates a new entry; `Conflict` when the key exists
    async fn insert(&self, entry: &ConfigEntry) -> Result<(), PortError>;

    /// Replaces the value of an existing entry; `NotFound` when absent
    async fn set_value(&self, key: &str, value: &str) -> Result<ConfigEntry, PortError>;

    /// All entries ordered by key
    async fn list(&self) -> Result<Vec<ConfigEntry>, PortError>;

    /// Removes an entry; `NotFound` when absent
    async fn delete(&self, key: &str) -> Result<(), PortError>;

    /// Atomically increments a numeric counter entry and returns the new
    /// value; an absent key is created with value 1. Concurrent callers
    /// always observe distinct values.
    async fn increment_counter(&self, key: &str) -> Result<i64, PortError>;
}

/// Persistence for receipt attachments
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Stores an attachment
    async fn insert(&self, attachment: &ReceiptAttachment) -> Result<(), PortError>;

    /// Finds an attachment by id, content included
    async fn find(&self, id: AttachmentId) -> Result<Option<ReceiptAttachment>, PortError>;

    /// Lists attachment rows for a payment, oldest first
    async fn for_payment(&self, payment_id: PaymentId)
        -> Result<Vec<ReceiptAttachment>, PortError>;
}
