//! Profile routes. One profile per user, upsert on write.

use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::api::ApiJson;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::ProfilePatch;
use crate::routes::AppState;

/// GET /api/profiles/me - the caller's profile, or JSON null when none
/// exists yet.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let body = match state.store.get_profile(auth.id).await? {
        Some(profile) => json!({ "name": profile.name, "email": profile.email }),
        None => Value::Null,
    };
    Ok(Json(body))
}

/// PATCH /api/profiles/me - upsert the caller's profile name.
pub async fn patch_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .store
        .upsert_profile(auth.id, &auth.email, patch.name.as_deref())
        .await?;

    Ok(Json(json!({ "name": profile.name, "email": profile.email })))
}
