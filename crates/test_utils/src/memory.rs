//! In-Memory Storage Adapters
//!
//! Implements every storage port over plain hash maps behind mutexes, with
//! the same observable semantics as the PostgreSQL adapters: unique
//! (player, period) per due, unique receipt numbers, optimistic version
//! checks on due updates, and an atomic receipt counter. Scenario tests run
//! the real services against these without a database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use core_kernel::{AttachmentId, BillingPeriod, DueId, PaymentId, PlayerId, PortError};
use domain_dues::{
    ConfigEntry, ConfigValueType, Due, DueFilter, DueStatus, Payment, ReceiptAttachment,
};
use domain_dues::{AttachmentStore, ConfigStore, DueStore, PaymentFilter, PaymentStore};
use domain_roster::{ActivePlayer, Player, PlayerDirectory};

/// Sort key: newest billing period first
fn period_desc(a: &Due, b: &Due) -> std::cmp::Ordering {
    (b.period.year(), b.period.month()).cmp(&(a.period.year(), a.period.month()))
}

/// In-memory due storage
#[derive(Default)]
pub struct MemoryDueStore {
    rows: Mutex<HashMap<DueId, Due>>,
}

impl MemoryDueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct insert that bypasses the uniqueness check, for seeding
    /// deliberately odd states
    pub fn seed(&self, due: Due) {
        self.rows.lock().unwrap().insert(due.id, due);
    }
}

#[async_trait]
impl DueStore for MemoryDueStore {
    async fn insert(&self, due: &Due) -> Result<(), PortError> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows
            .values()
            .any(|existing| existing.player_id == due.player_id && existing.period == due.period);
        if duplicate {
            return Err(PortError::conflict(format!(
                "due already exists for player {} in {}",
                due.player_id, due.period
            )));
        }
        rows.insert(due.id, due.clone());
        Ok(())
    }

    async fn find(&self, id: DueId) -> Result<Option<Due>, PortError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, due: &Due) -> Result<Due, PortError> {
        let mut rows = self.rows.lock().unwrap();
        let stored = rows
            .get_mut(&due.id)
            .ok_or_else(|| PortError::not_found("Due", due.id))?;
        if stored.version != due.version {
            return Err(PortError::concurrency(format!(
                "due {} version moved from {} to {}",
                due.id, due.version, stored.version
            )));
        }
        let mut updated = due.clone();
        updated.version += 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: DueId) -> Result<(), PortError> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Due", id))
    }

    async fn list(&self, filter: &DueFilter) -> Result<Vec<Due>, PortError> {
        let rows = self.rows.lock().unwrap();
        let mut dues: Vec<Due> = rows
            .values()
            .filter(|due| filter.player_id.map_or(true, |id| due.player_id == id))
            .filter(|due| filter.period.map_or(true, |period| due.period == period))
            .filter(|due| filter.status.map_or(true, |status| due.status == status))
            .cloned()
            .collect();
        dues.sort_by(period_desc);
        Ok(dues)
    }

    async fn for_period(&self, period: BillingPeriod) -> Result<Vec<Due>, PortError> {
        self.list(&DueFilter {
            period: Some(period),
            ..Default::default()
        })
        .await
    }

    async fn for_player(&self, player_id: PlayerId) -> Result<Vec<Due>, PortError> {
        self.list(&DueFilter {
            player_id: Some(player_id),
            ..Default::default()
        })
        .await
    }

    async fn past_tolerance(&self, cutoff: NaiveDate) -> Result<Vec<Due>, PortError> {
        let rows = self.rows.lock().unwrap();
        let mut dues: Vec<Due> = rows
            .values()
            .filter(|due| {
                matches!(due.status, DueStatus::Pending | DueStatus::Partial)
                    && due.due_date < cutoff
            })
            .cloned()
            .collect();
        dues.sort_by_key(|due| due.due_date);
        Ok(dues)
    }

    async fn mark_overdue(&self, cutoff: NaiveDate) -> Result<u64, PortError> {
        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0u64;
        for due in rows.values_mut() {
            if matches!(due.status, DueStatus::Pending | DueStatus::Partial)
                && due.due_date < cutoff
            {
                due.status = DueStatus::Overdue;
                due.version += 1;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn with_outstanding_debt(&self, today: NaiveDate) -> Result<Vec<Due>, PortError> {
        let rows = self.rows.lock().unwrap();
        let mut dues: Vec<Due> = rows
            .values()
            .filter(|due| {
                due.balance.is_positive()
                    && (matches!(due.status, DueStatus::Overdue | DueStatus::Partial)
                        || (due.status == DueStatus::Pending && due.due_date < today))
            })
            .cloned()
            .collect();
        dues.sort_by_key(|due| due.due_date);
        Ok(dues)
    }
}

/// In-memory payment storage
///
/// Holds a handle to the due store so the combined write operations can
/// honor the same version protocol as a database transaction.
pub struct MemoryPaymentStore {
    rows: Mutex<HashMap<PaymentId, Payment>>,
    receipts: Mutex<HashSet<String>>,
    dues: Arc<MemoryDueStore>,
}

impl MemoryPaymentStore {
    pub fn new(dues: Arc<MemoryDueStore>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashSet::new()),
            dues,
        }
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError> {
        {
            let receipts = self.receipts.lock().unwrap();
            if receipts.contains(payment.receipt_number.as_str()) {
                return Err(PortError::conflict(format!(
                    "duplicate receipt number {}",
                    payment.receipt_number
                )));
            }
        }
        let stored = self.dues.update(due).await?;
        self.receipts
            .lock()
            .unwrap()
            .insert(payment.receipt_number.as_str().to_string());
        self.rows.lock().unwrap().insert(payment.id, payment.clone());
        Ok(stored)
    }

    async fn update_with_due(&self, payment: &Payment, due: &Due) -> Result<Due, PortError> {
        let stored = self.dues.update(due).await?;
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&payment.id) {
            return Err(PortError::not_found("Payment", payment.id));
        }
        rows.insert(payment.id, payment.clone());
        Ok(stored)
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, PortError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, PortError> {
        let period_of = |payment: &Payment| -> Option<BillingPeriod> {
            self.dues
                .rows
                .lock()
                .unwrap()
                .get(&payment.due_id)
                .map(|due| due.period)
        };
        let rows = self.rows.lock().unwrap();
        let mut payments: Vec<Payment> = rows
            .values()
            .filter(|p| filter.include_voided || !p.voided)
            .filter(|p| filter.player_id.map_or(true, |id| p.player_id == id))
            .filter(|p| filter.method.map_or(true, |m| p.method == m))
            .filter(|p| filter.from.map_or(true, |from| p.paid_at.date_naive() >= from))
            .filter(|p| filter.to.map_or(true, |to| p.paid_at.date_naive() <= to))
            .filter(|p| {
                filter
                    .due_period
                    .map_or(true, |period| period_of(p) == Some(period))
            })
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }

    async fn for_due(&self, due_id: DueId) -> Result<Vec<Payment>, PortError> {
        let rows = self.rows.lock().unwrap();
        let mut payments: Vec<Payment> = rows
            .values()
            .filter(|p| p.due_id == due_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.paid_at);
        Ok(payments)
    }

    async fn count_for_due(&self, due_id: DueId) -> Result<u64, PortError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|p| p.due_id == due_id).count() as u64)
    }
}

/// In-memory configuration storage
#[derive(Default)]
pub struct MemoryConfigStore {
    rows: Mutex<HashMap<String, ConfigEntry>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<ConfigEntry>, PortError> {
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn insert(&self, entry: &ConfigEntry) -> Result<(), PortError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&entry.key) {
            return Err(PortError::conflict(format!(
                "configuration key {} already exists",
                entry.key
            )));
        }
        rows.insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<ConfigEntry, PortError> {
        let mut rows = self.rows.lock().unwrap();
        let entry = rows
            .get_mut(key)
            .ok_or_else(|| PortError::not_found("ConfigEntry", key))?;
        entry.value = value.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn list(&self) -> Result<Vec<ConfigEntry>, PortError> {
        let rows = self.rows.lock().unwrap();
        let mut entries: Vec<ConfigEntry> = rows.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn delete(&self, key: &str) -> Result<(), PortError> {
        self.rows
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("ConfigEntry", key))
    }

    async fn increment_counter(&self, key: &str) -> Result<i64, PortError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(key) {
            Some(entry) => {
                let current: i64 = entry.value.trim().parse().map_err(|_| {
                    PortError::validation(format!(
                        "counter {} holds non-numeric value {:?}",
                        key, entry.value
                    ))
                })?;
                let next = current + 1;
                entry.value = next.to_string();
                entry.updated_at = Utc::now();
                Ok(next)
            }
            None => {
                rows.insert(
                    key.to_string(),
                    ConfigEntry::new(key, "1", ConfigValueType::Number),
                );
                Ok(1)
            }
        }
    }
}

/// In-memory attachment storage
#[derive(Default)]
pub struct MemoryAttachmentStore {
    rows: Mutex<HashMap<AttachmentId, ReceiptAttachment>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn insert(&self, attachment: &ReceiptAttachment) -> Result<(), PortError> {
        self.rows
            .lock()
            .unwrap()
            .insert(attachment.id, attachment.clone());
        Ok(())
    }

    async fn find(&self, id: AttachmentId) -> Result<Option<ReceiptAttachment>, PortError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn for_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<ReceiptAttachment>, PortError> {
        let rows = self.rows.lock().unwrap();
        let mut attachments: Vec<ReceiptAttachment> = rows
            .values()
            .filter(|a| a.payment_id == payment_id)
            .cloned()
            .collect();
        attachments.sort_by_key(|a| a.uploaded_at);
        Ok(attachments)
    }
}

/// In-memory roster directory
#[derive(Default)]
pub struct MemoryPlayerDirectory {
    players: Mutex<Vec<Player>>,
}

impl MemoryPlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player to the roster
    pub fn add(&self, player: Player) {
        self.players.lock().unwrap().push(player);
    }

    /// Flips a player's active flag
    pub fn set_active(&self, id: PlayerId, active: bool) {
        let mut players = self.players.lock().unwrap();
        if let Some(player) = players.iter_mut().find(|p| p.id == id) {
            player.is_active = active;
        }
    }
}

#[async_trait]
impl PlayerDirectory for MemoryPlayerDirectory {
    async fn list_active(&self) -> Result<Vec<ActivePlayer>, PortError> {
        let players = self.players.lock().unwrap();
        Ok(players
            .iter()
            .filter(|p| p.is_active)
            .map(ActivePlayer::from)
            .collect())
    }

    async fn find(&self, id: PlayerId) -> Result<Option<Player>, PortError> {
        let players = self.players.lock().unwrap();
        Ok(players.iter().find(|p| p.id == id).cloned())
    }

    async fn find_many(&self, ids: &[PlayerId]) -> Result<Vec<Player>, PortError> {
        let players = self.players.lock().unwrap();
        Ok(players
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn count_all(&self) -> Result<u64, PortError> {
        Ok(self.players.lock().unwrap().len() as u64)
    }

    async fn count_active(&self) -> Result<u64, PortError> {
        let players = self.players.lock().unwrap();
        Ok(players.iter().filter(|p| p.is_active).count() as u64)
    }
}
