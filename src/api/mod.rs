//! HTTP/WS API module using Axum
//!
//! Provides the query endpoints (snapshot, risk assessment, scenario and
//! policy simulation, cascade analysis, presets) and the two streaming
//! endpoints (prediction subscription, data ingestion).

pub mod envelope;
pub mod handlers;
mod routes;
mod ws;

pub use handlers::ServiceState;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Liveness endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Create the complete application router.
pub fn create_app(state: ServiceState) -> Router {
    // CORS configuration (permissive for development)
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .nest("/ws", routes::ws_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
