//! Reporting handlers
//!
//! All reports are read-only and available to any authenticated user.

use axum::extract::{Path, Query, State};
use axum::Json;
use core_kernel::BillingPeriod;
use domain_dues::{
    ArrearsReport, CashReport, CategoryComplianceReport, ClubStatistics, IncomeProjection,
};

use crate::dto::CashQueryParams;
use crate::error::ApiError;
use crate::AppState;

/// GET /api/v1/reports/cash
pub async fn cash(
    State(state): State<AppState>,
    Query(params): Query<CashQueryParams>,
) -> Result<Json<CashReport>, ApiError> {
    let report = state.reports.cash_report(params.into_query()?).await?;
    Ok(Json(report))
}

/// GET /api/v1/reports/arrears
pub async fn arrears(State(state): State<AppState>) -> Result<Json<ArrearsReport>, ApiError> {
    Ok(Json(state.reports.arrears_report().await?))
}

/// GET /api/v1/reports/projection/:year/:month
pub async fn projection(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<IncomeProjection>, ApiError> {
    let period =
        BillingPeriod::new(month, year).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(state.reports.income_projection(period).await?))
}

/// GET /api/v1/reports/compliance/:year/:month
pub async fn compliance(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<CategoryComplianceReport>, ApiError> {
    let period =
        BillingPeriod::new(month, year).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(state.reports.compliance_by_category(period).await?))
}

/// GET /api/v1/reports/statistics
pub async fn statistics(State(state): State<AppState>) -> Result<Json<ClubStatistics>, ApiError> {
    Ok(Json(state.reports.general_statistics().await?))
}
