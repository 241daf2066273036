//! Application route configuration.

use axum::{extract::DefaultBodyLimit, extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::handlers::{auth_routes, order_routes, product_routes};
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media_root);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(auth_routes())
        .merge(product_routes())
        .merge(order_routes())
        .route("/health", get(health))
        // Uploaded product photos
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
