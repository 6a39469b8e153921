//! Medical report routes. All operations owner-scoped.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::api::{parse_id, ApiJson};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{NewReport, ReportPatch};
use crate::routes::AppState;

/// GET /api/reports - the caller's reports, newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_reports(auth.id).await?;
    Ok(Json(rows))
}

/// POST /api/reports
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.store.create_report(auth.id, body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/reports/:id - partial update; absent or foreign ids are
/// an explicit not-found.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ReportPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    match state.store.update_report(auth.id, id, patch).await? {
        Some(row) => Ok(Json(row)),
        None => Err(ApiError::not_found("Report not found")),
    }
}

/// DELETE /api/reports/:id - idempotent owner-scoped delete.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete_report(auth.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}
