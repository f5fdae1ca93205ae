//! Due request/response types

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BillingPeriod, DueId, PlayerId};
use domain_dues::{Due, DueFilter, DueStatus, GenerationOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// Body for the monthly generation run
///
/// Month and year default to the current billing month; the due date
/// defaults to thirty days out.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateDuesRequest {
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
    #[validate(range(min = 2000, max = 2100))]
    pub year: Option<i32>,
    pub due_date: Option<NaiveDate>,
}

impl GenerateDuesRequest {
    /// Resolves the optional month/year pair into a billing period
    pub fn period(&self) -> Result<Option<BillingPeriod>, ApiError> {
        match (self.month, self.year) {
            (Some(month), Some(year)) => BillingPeriod::new(month, year)
                .map(Some)
                .map_err(|e| ApiError::BadRequest(e.to_string())),
            (None, None) => Ok(None),
            _ => Err(ApiError::BadRequest(
                "month and year must be provided together".to_string(),
            )),
        }
    }
}

/// Outcome of a generation run
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub month: u32,
    pub year: i32,
    pub generated: u64,
    pub existing: u64,
}

impl From<GenerationOutcome> for GenerationResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            month: outcome.period.month(),
            year: outcome.period.year(),
            generated: outcome.generated,
            existing: outcome.existing,
        }
    }
}

/// A due as served by the API
#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub id: DueId,
    pub player_id: PlayerId,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
    pub currency: String,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub due_date: NaiveDate,
    pub status: DueStatus,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl From<Due> for DueResponse {
    fn from(due: Due) -> Self {
        Self {
            id: due.id,
            player_id: due.player_id,
            month: due.period.month(),
            year: due.period.year(),
            amount: due.amount.amount(),
            currency: due.amount.currency().to_string(),
            amount_paid: due.amount_paid.amount(),
            balance: due.balance.amount(),
            due_date: due.due_date,
            status: due.status,
            created_at: due.created_at,
            version: due.version,
        }
    }
}

/// Body for moving a due date
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub due_date: NaiveDate,
}

/// Query parameters for listing dues
#[derive(Debug, Default, Deserialize)]
pub struct ListDuesQuery {
    pub player_id: Option<Uuid>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<DueStatus>,
}

impl ListDuesQuery {
    pub fn into_filter(self) -> Result<DueFilter, ApiError> {
        let period = match (self.month, self.year) {
            (Some(month), Some(year)) => Some(
                BillingPeriod::new(month, year)
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "month and year must be provided together".to_string(),
                ))
            }
        };
        Ok(DueFilter {
            player_id: self.player_id.map(PlayerId::from_uuid),
            period,
            status: self.status,
        })
    }
}

/// Outcome of an overdue sweep
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub marked_overdue: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_without_year_is_rejected() {
        let query = ListDuesQuery {
            month: Some(3),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn invalid_month_is_rejected() {
        let query = ListDuesQuery {
            month: Some(13),
            year: Some(2026),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn empty_query_builds_an_open_filter() {
        let filter = ListDuesQuery::default().into_filter().expect("filter");
        assert!(filter.player_id.is_none());
        assert!(filter.period.is_none());
        assert!(filter.status.is_none());
    }
}
