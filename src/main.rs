use anyhow::Context;
use std::sync::Arc;

use symptomsense_api::ai::{AiGateway, OpenAiProvider};
use symptomsense_api::auth::TokenService;
use symptomsense_api::config;
use symptomsense_api::routes::{app, AppState};
use symptomsense_api::store::postgres::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!(
        "Starting SymptomSense API in {} mode",
        config.environment.as_str()
    );

    let database_url =
        std::env::var("DATABASE_URL").context("Missing DATABASE_URL in environment")?;
    let store = PgStore::connect(&database_url)
        .await
        .context("database connection failed")?;

    let state = AppState {
        store: Arc::new(store),
        tokens: TokenService::new(
            config.security.jwt_secret.as_str(),
            config.security.jwt_expiry_days,
        ),
        ai: Arc::new(AiGateway::new(Arc::new(OpenAiProvider::new(&config.openai)))),
        env: config.environment.as_str().to_string(),
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
