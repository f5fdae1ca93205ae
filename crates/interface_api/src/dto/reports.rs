//! Report query parameters
//!
//! The report bodies themselves are the domain report types, which
//! serialize directly.

use chrono::NaiveDate;
use core_kernel::BillingPeriod;
use domain_dues::{CashGrouping, CashQuery};
use serde::Deserialize;

use crate::error::ApiError;

/// Query parameters for the cash report
///
/// A billing month takes precedence over a payment date range when both
/// are given.
#[derive(Debug, Default, Deserialize)]
pub struct CashQueryParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub group_by: Option<CashGrouping>,
}

impl CashQueryParams {
    pub fn into_query(self) -> Result<CashQuery, ApiError> {
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
        Ok(CashQuery {
            from: self.from,
            to: self.to,
            period,
            group_by: self.group_by.unwrap_or(CashGrouping::Day),
        })
    }
}
