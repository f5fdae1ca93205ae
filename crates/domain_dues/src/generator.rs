//! Monthly due generation
//!
//! Creates one due per active player for a billing month, priced at the
//! player's category fee. Generation is idempotent: players already billed
//! for the month are skipped, so a partially failed run can simply be
//! retried.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::period::default_due_date;
use core_kernel::{BillingPeriod, PlayerId};
use domain_roster::PlayerDirectory;
use serde::{Deserialize, Serialize};

use crate::due::Due;
use crate::error::DuesError;
use crate::ports::DueStore;

/// Parameters for a generation run; both default when omitted
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Billing month, defaulting to the current one
    pub period: Option<BillingPeriod>,
    /// Payment deadline, defaulting to thirty days out
    pub due_date: Option<NaiveDate>,
}

/// Result of a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Billing month that was generated
    pub period: BillingPeriod,
    /// Dues created by this run
    pub generated: u64,
    /// Active players that already had a due for the month
    pub existing: u64,
}

/// Service that generates monthly dues from the roster
#[derive(Clone)]
pub struct DueGenerator {
    dues: Arc<dyn DueStore>,
    directory: Arc<dyn PlayerDirectory>,
}

impl DueGenerator {
    pub fn new(dues: Arc<dyn DueStore>, directory: Arc<dyn PlayerDirectory>) -> Self {
        Self { dues, directory }
    }

    /// Generates dues for every active player not yet billed for the month
    ///
    /// A concurrent run may insert a due between our read and our write;
    /// the unique (player, period) constraint turns that into a conflict,
    /// which is counted as existing rather than failing the run.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerationOutcome, DuesError> {
        let period = request.period.unwrap_or_else(BillingPeriod::current);
        let due_date = request.due_date.unwrap_or_else(default_due_date);

        let roster = self.directory.list_active().await?;
        if roster.is_empty() {
            return Err(DuesError::NoActivePlayers);
        }

        let billed: HashSet<PlayerId> = self
            .dues
            .for_period(period)
            .await?
            .iter()
            .map(|due| due.player_id)
            .collect();

        let mut generated = 0u64;
        let mut existing = billed.len() as u64;
        for player in roster.iter().filter(|p| !billed.contains(&p.player_id)) {
            let due = Due::new(player.player_id, period, player.monthly_fee, due_date);
            match self.dues.insert(&due).await {
                Ok(()) => generated += 1,
                Err(error) if error.is_conflict() => {
                    tracing::warn!(
                        player_id = %player.player_id,
                        %period,
                        "due created concurrently, counting as existing"
                    );
                    existing += 1;
                }
                Err(error) => return Err(error.into()),
            }
        }

        tracing::info!(%period, generated, existing, "due generation complete");
        Ok(GenerationOutcome {
            period,
            generated,
            existing,
        })
    }
}
