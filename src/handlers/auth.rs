//! Auth routes: signup, signin, password update.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::api::ApiJson;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{SigninRequest, SignupRequest, UpdatePasswordRequest};
use crate::routes::AppState;

/// POST /api/auth/signup - create a user and its profile, return a
/// session token.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(ApiError::bad_request("Missing email or password"));
    };

    // The store's unique index is the backstop; this check gives the
    // friendly message without burning a failed insert.
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&password).map_err(|e| {
        tracing::error!("signup hash failure: {}", e);
        ApiError::internal_server_error("Internal error")
    })?;

    let user = state.store.create_user(&email, &password_hash).await?;
    state
        .store
        .upsert_profile(user.id, &user.email, body.name.as_deref())
        .await?;

    let token = state.tokens.issue(user.id, &user.email).map_err(|e| {
        tracing::error!("token issuance failure: {}", e);
        ApiError::internal_server_error("Internal error")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": { "id": user.id, "email": user.email } })),
    ))
}

/// POST /api/auth/signin - verify credentials, return a session token.
/// Unknown email and wrong password are indistinguishable to the
/// caller.
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(ApiError::bad_request("Missing email or password"));
    };

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(user.id, &user.email).map_err(|e| {
        tracing::error!("token issuance failure: {}", e);
        ApiError::internal_server_error("Internal error")
    })?;

    Ok(Json(
        json!({ "token": token, "user": { "id": user.id, "email": user.email } }),
    ))
}

/// POST /api/auth/update-password (auth)
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(new_password) = non_empty(body.new_password) else {
        return Err(ApiError::bad_request("Missing newPassword"));
    };

    if state.store.find_user_by_id(auth.id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let password_hash = hash_password(&new_password).map_err(|e| {
        tracing::error!("password update hash failure: {}", e);
        ApiError::internal_server_error("Internal error")
    })?;

    state
        .store
        .update_password_hash(auth.id, &password_hash)
        .await?;

    Ok(Json(json!({ "ok": true })))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
