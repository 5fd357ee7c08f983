use std::sync::Arc;

use cinescope_api::{
    config::Config,
    routes::{create_router, AppState},
    services::providers::TmdbProvider,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.query_timeout(),
    )?;

    tracing::info!(
        api_url = %config.tmdb_api_url,
        query_timeout_ms = config.query_timeout_ms,
        "TMDB provider configured"
    );

    // Initialize application state
    let state = Arc::new(AppState::new(Arc::new(provider), config.query_timeout()));

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
