//! Payment and receipt attachment handlers

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use core_kernel::{AttachmentId, DueId, PaymentId, UserId};
use domain_dues::{mime_type_allowed, AttachmentMetadata, MAX_ATTACHMENT_BYTES};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{require_role, roles, Claims};
use crate::dto::{
    AttachmentUploadRequest, ListPaymentsQuery, PaymentResponse, RecordPaymentRequest,
    RecordPaymentResponse, VoidPaymentRequest,
};
use crate::error::ApiError;
use crate::AppState;

fn acting_user(claims: &Claims) -> Result<UserId, ApiError> {
    claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("token subject is not a user id".to_string()))
}

/// POST /api/v1/payments
pub async fn record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), ApiError> {
    require_role(&claims, roles::TREASURER)?;
    request.validate()?;
    let recorded_by = acting_user(&claims)?;
    let (payment, due) = state
        .recorder
        .record(request.into_new_payment()?, recorded_by)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse {
            payment: payment.into(),
            due: due.into(),
        }),
    ))
}

/// GET /api/v1/payments
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state.recorder.list(&query.into_filter()?).await?;
    Ok(Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}

/// GET /api/v1/payments/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state.recorder.payment(PaymentId::from_uuid(id)).await?;
    Ok(Json(payment.into()))
}

/// GET /api/v1/payments/due/:due_id
pub async fn for_due(
    State(state): State<AppState>,
    Path(due_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state
        .recorder
        .payments_for_due(DueId::from_uuid(due_id))
        .await?;
    Ok(Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}

/// POST /api/v1/payments/:id/void
pub async fn void(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<VoidPaymentRequest>,
) -> Result<Json<RecordPaymentResponse>, ApiError> {
    require_role(&claims, roles::TREASURER)?;
    request.validate()?;
    let acting = acting_user(&claims)?;
    let (payment, due) = state
        .recorder
        .void(PaymentId::from_uuid(id), request.reason, acting)
        .await?;
    Ok(Json(RecordPaymentResponse {
        payment: payment.into(),
        due: due.into(),
    }))
}

/// POST /api/v1/payments/:id/attachments
pub async fn attach_receipt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<AttachmentUploadRequest>,
) -> Result<(StatusCode, Json<AttachmentMetadata>), ApiError> {
    require_role(&claims, roles::TREASURER)?;
    request.validate()?;
    if !mime_type_allowed(&request.mime_type) {
        return Err(ApiError::BadRequest(format!(
            "unsupported content type '{}'",
            request.mime_type
        )));
    }
    let bytes = BASE64
        .decode(&request.content_base64)
        .map_err(|_| ApiError::BadRequest("content is not valid base64".to_string()))?;
    if bytes.len() > MAX_ATTACHMENT_BYTES {
        return Err(ApiError::BadRequest(format!(
            "attachment exceeds the {} byte limit",
            MAX_ATTACHMENT_BYTES
        )));
    }
    let metadata = state
        .recorder
        .attach_receipt(
            PaymentId::from_uuid(id),
            &request.filename,
            &request.mime_type,
            &bytes,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(metadata)))
}

/// GET /api/v1/payments/:id/attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttachmentMetadata>>, ApiError> {
    let rows = state
        .recorder
        .attachments_for_payment(PaymentId::from_uuid(id))
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/payments/attachments/:attachment_id
///
/// Serves the decoded file with its stored content type.
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(attachment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let attachment = state
        .recorder
        .attachment(AttachmentId::from_uuid(attachment_id))
        .await?;
    let bytes = attachment
        .decode()
        .map_err(|_| ApiError::Internal("stored attachment content is corrupt".to_string()))?;
    let disposition = format!("attachment; filename=\"{}\"", attachment.filename);
    Ok((
        [
            (header::CONTENT_TYPE, attachment.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
