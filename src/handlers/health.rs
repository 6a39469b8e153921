use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::routes::AppState;

/// GET /api/health - liveness only, no dependency check.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "env": state.env }))
}
