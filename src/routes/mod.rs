use axum::{
    http::{Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{providers::MetadataProvider, Aggregator},
};

pub mod catalogue;
pub mod titles;

/// Shared application state
pub struct AppState {
    pub provider: Arc<dyn MetadataProvider>,
    pub aggregator: Aggregator,
}

impl AppState {
    /// Wires the aggregator to the same provider used for direct lookups
    pub fn new(provider: Arc<dyn MetadataProvider>, query_timeout: Duration) -> Self {
        Self {
            aggregator: Aggregator::new(provider.clone(), query_timeout),
            provider,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // The browser client calls this API cross-origin, read-only
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles/search", get(titles::search))
        .route("/titles/:kind/:id", get(titles::details))
        .route("/titles/:kind/:id/related", get(titles::related))
        .route("/catalogue/:category", get(catalogue::listing))
        .route("/genres/:kind", get(catalogue::genres))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
