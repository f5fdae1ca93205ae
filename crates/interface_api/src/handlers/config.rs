//! Club configuration handlers
//!
//! Reads are open to any authenticated user; writes require the admin
//! role since keys like the tolerance window change financial behavior.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use domain_dues::ConfigEntry;
use validator::Validate;

use crate::auth::{require_role, roles, Claims};
use crate::dto::{ConfigResponse, CreateConfigRequest, UpdateConfigRequest};
use crate::error::ApiError;
use crate::AppState;

/// GET /api/v1/config
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ConfigResponse>>, ApiError> {
    let entries = state.config_store.list().await?;
    Ok(Json(entries.into_iter().map(ConfigResponse::from).collect()))
}

/// GET /api/v1/config/:key
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let entry = state
        .config_store
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("config key '{key}'")))?;
    Ok(Json(entry.into()))
}

/// POST /api/v1/config
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateConfigRequest>,
) -> Result<(StatusCode, Json<ConfigResponse>), ApiError> {
    require_role(&claims, roles::ADMIN)?;
    request.validate()?;
    let mut entry = ConfigEntry::new(request.key, request.value, request.value_type);
    if let Some(description) = request.description {
        entry = entry.with_description(description);
    }
    state.config_store.insert(&entry).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// PUT /api/v1/config/:key
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(key): Path<String>,
    Json(request): Json<UpdateConfigRequest>,
) -> Result<Json<ConfigResponse>, ApiError> {
    require_role(&claims, roles::ADMIN)?;
    request.validate()?;
    let entry = state.config_store.set_value(&key, &request.value).await?;
    Ok(Json(entry.into()))
}

/// DELETE /api/v1/config/:key
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, roles::ADMIN)?;
    state.config_store.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
