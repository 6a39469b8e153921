//! Diagnosis history and feedback routes. All operations owner-scoped.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::api::{parse_id, ApiJson};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{NewDiagnosis, NewFeedback};
use crate::routes::AppState;

/// GET /api/diagnosis - the caller's history, newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_diagnoses(auth.id).await?;
    Ok(Json(rows))
}

/// POST /api/diagnosis - persist a diagnosis result. Owner comes from
/// the token, never the body.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewDiagnosis>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.store.create_diagnosis(auth.id, body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/diagnosis/:id - idempotent owner-scoped delete.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete_diagnosis(auth.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/diagnosis/feedback - record whether a diagnosis helped.
/// The referenced diagnosis id is shape-validated only; existence is
/// not checked.
pub async fn feedback(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewFeedback>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.store.create_feedback(auth.id, body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
