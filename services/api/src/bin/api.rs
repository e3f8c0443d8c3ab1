//! services/api/src/bin/api.rs

use api_lib::{
    adapters::DirectusAdapter,
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use std::sync::Arc;
use story_portal_core::ContentCatalog;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        admin_token_configured = config.directus_admin_token.is_some(),
        "Configuration loaded. Starting server..."
    );
    if config.directus_url.is_none() {
        warn!("DIRECTUS_URL is not set; every content route will answer 500 until it is");
    }

    // --- 2. Initialize the Content Backend Adapter ---
    let directus = Arc::new(DirectusAdapter::new(config.directus_url.clone()));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        catalog: ContentCatalog::new(directus),
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let app = build_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
