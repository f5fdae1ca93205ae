//! Due management handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use core_kernel::{BillingPeriod, DueId, PlayerId};
use domain_dues::GenerateRequest;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{require_role, roles, Claims};
use crate::dto::{
    DueResponse, GenerateDuesRequest, GenerationResponse, ListDuesQuery, RescheduleRequest,
    SweepResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// POST /api/v1/dues/generate
pub async fn generate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<GenerateDuesRequest>,
) -> Result<(StatusCode, Json<GenerationResponse>), ApiError> {
    require_role(&claims, roles::TREASURER)?;
    request.validate()?;
    let outcome = state
        .generator
        .generate(GenerateRequest {
            period: request.period()?,
            due_date: request.due_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /api/v1/dues
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListDuesQuery>,
) -> Result<Json<Vec<DueResponse>>, ApiError> {
    let dues = state.ledger.list(&query.into_filter()?).await?;
    Ok(Json(dues.into_iter().map(DueResponse::from).collect()))
}

/// GET /api/v1/dues/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DueResponse>, ApiError> {
    let due = state.ledger.due(DueId::from_uuid(id)).await?;
    Ok(Json(due.into()))
}

/// GET /api/v1/dues/player/:player_id
pub async fn for_player(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Vec<DueResponse>>, ApiError> {
    let dues = state
        .ledger
        .dues_for_player(PlayerId::from_uuid(player_id))
        .await?;
    Ok(Json(dues.into_iter().map(DueResponse::from).collect()))
}

/// PUT /api/v1/dues/:id/due-date
pub async fn reschedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<DueResponse>, ApiError> {
    require_role(&claims, roles::TREASURER)?;
    let due = state
        .ledger
        .reschedule(DueId::from_uuid(id), request.due_date)
        .await?;
    Ok(Json(due.into()))
}

/// DELETE /api/v1/dues/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, roles::TREASURER)?;
    state.ledger.delete_due(DueId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/dues/overdue
pub async fn list_overdue(
    State(state): State<AppState>,
) -> Result<Json<Vec<DueResponse>>, ApiError> {
    let dues = state.ledger.list_overdue().await?;
    Ok(Json(dues.into_iter().map(DueResponse::from).collect()))
}

/// POST /api/v1/dues/overdue/sweep
pub async fn sweep_overdue(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SweepResponse>, ApiError> {
    require_role(&claims, roles::TREASURER)?;
    let marked_overdue = state.ledger.sweep_overdue().await?;
    Ok(Json(SweepResponse { marked_overdue }))
}

/// GET /api/v1/dues/summary/:year/:month
pub async fn period_summary(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<domain_dues::PeriodSummary>, ApiError> {
    let period =
        BillingPeriod::new(month, year).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let summary = state.ledger.period_summary(period).await?;
    Ok(Json(summary))
}
