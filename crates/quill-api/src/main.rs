//! Quill API Server

use quill_api::{create_router, state::AppState};
use quill_core::{AppConfig, MemoryUserStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    if config.auth.token_secret.is_none() {
        tracing::warn!(
            "TOKEN_SECRET is not set; every token-issuing and token-verifying \
             endpoint will report a server error until it is configured"
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state with the in-process store
    let store = Arc::new(MemoryUserStore::new());
    let state = Arc::new(AppState::new(config, store));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Quill API server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
