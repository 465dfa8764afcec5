pub mod response;

use crate::config::Config;
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::middleware;
use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::compression::CompressionLayer;

use self::response::ApiResponse;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    records: u64,
}

/// Create the application router with all routes and middleware
///
/// The client id guard sits innermost so that CORS preflights and the
/// request trace see every request, including rejected ones.
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let feature_state = FeatureState {
        ingest: config.ingest.clone(),
        max_upload_bytes: config.server.max_upload_bytes,
        ..state
    };

    Router::new()
        .route("/health", get(health_check))
        .with_state(feature_state.clone())
        .nest("/api", features::router(feature_state))
        .fallback(not_found)
        // Apply layers from innermost to outermost
        .layer(middleware::GuardLayer::client_id(config.client.client_id.clone()))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<FeatureState>) -> Result<Response, AppError> {
    let records = state.store.count().await?;
    Ok(ApiResponse::success(HealthStatus {
        status: "healthy",
        records,
    })
    .into_response())
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
