use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

/// Authenticated identity extracted from the session token and
/// injected into request extensions for handlers.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Bearer-token gate wrapping every route except health, signup and
/// signin. Missing token and invalid/expired token are distinguished
/// only by message; both are 401.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing token"))?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
