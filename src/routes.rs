//! Application state and route table.

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ai::AiGateway;
use crate::auth::TokenService;
use crate::handlers;
use crate::middleware::require_auth;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub ai: Arc<AiGateway>,
    pub env: String,
}

/// Builds the full application router. Everything except health,
/// signup and signin sits behind the bearer-token gate.
pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/signin", post(handlers::auth::signin));

    let protected = Router::new()
        .route(
            "/api/auth/update-password",
            post(handlers::auth::update_password),
        )
        .route(
            "/api/profiles/me",
            get(handlers::profiles::get_me).patch(handlers::profiles::patch_me),
        )
        .route(
            "/api/diagnosis",
            get(handlers::diagnosis::list).post(handlers::diagnosis::create),
        )
        .route("/api/diagnosis/feedback", post(handlers::diagnosis::feedback))
        .route("/api/diagnosis/:id", delete(handlers::diagnosis::remove))
        .route(
            "/api/reports",
            get(handlers::reports::list).post(handlers::reports::create),
        )
        .route(
            "/api/reports/:id",
            patch(handlers::reports::update).delete(handlers::reports::remove),
        )
        .route("/api/ai/analyze-symptoms", post(handlers::ai::analyze_symptoms))
        .route("/api/ai/analyze-pill", post(handlers::ai::analyze_pill))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
