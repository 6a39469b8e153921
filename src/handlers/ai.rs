//! AI analysis routes. Thin wrappers over the gateway; validation and
//! fallback policy live there.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::ai::{PillRequest, SymptomRequest};
use crate::api::ApiJson;
use crate::error::ApiError;
use crate::routes::AppState;

/// POST /api/ai/analyze-symptoms - never returns an empty list for a
/// well-formed request.
pub async fn analyze_symptoms(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SymptomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let conditions = state.ai.analyze_symptoms(body).await?;
    Ok(Json(conditions))
}

/// POST /api/ai/analyze-pill
pub async fn analyze_pill(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let analysis = state.ai.analyze_pill(body).await?;
    Ok(Json(analysis))
}
