//! API route definitions
//!
//! Organizes endpoints for the risk-intelligence service:
//! - /api/v1/metrics/current  - Locality snapshot with freshness labels
//! - /api/v1/risk/assessment  - Cascading risk assessment
//! - /api/v1/scenario/simulate - Delta-based what-if simulation
//! - /api/v1/scenario/policy  - Policy intervention simulation
//! - /api/v1/scenario/presets - Fixed preset table
//! - /api/v1/cascade/analyze  - Cascade propagation analysis
//! - /ws/predictions, /ws/ingest - Streaming endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ServiceState};
use super::ws;

/// Create all REST API routes.
pub fn api_routes(state: ServiceState) -> Router {
    Router::new()
        .route("/metrics/current", get(handlers::get_current_metrics))
        .route("/risk/assessment", get(handlers::get_risk_assessment))
        .route("/scenario/simulate", post(handlers::simulate_scenario))
        .route("/scenario/policy", post(handlers::simulate_policy))
        .route("/scenario/presets", get(handlers::get_presets))
        .route("/cascade/analyze", get(handlers::analyze_cascade))
        .with_state(state)
}

/// Create the streaming routes.
pub fn ws_routes(state: ServiceState) -> Router {
    Router::new()
        .route("/predictions", get(ws::predictions_ws))
        .route("/ingest", get(ws::ingest_ws))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, RealtimeConfig};
    use crate::engine::CascadingRiskEngine;
    use crate::model::RiskModels;
    use crate::realtime::RealtimeStateManager;
    use crate::warehouse::SeededWarehouse;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> ServiceState {
        let engine = Arc::new(CascadingRiskEngine::new(
            RiskModels::pretrained().unwrap(),
            EngineConfig::default(),
        ));
        ServiceState {
            engine: engine.clone(),
            realtime: Arc::new(RealtimeStateManager::new(engine, RealtimeConfig::default())),
            warehouse: Arc::new(SeededWarehouse::new()),
        }
    }

    #[tokio::test]
    async fn metrics_current_returns_200() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics/current?locality=mumbai")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn risk_assessment_returns_200() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/risk/assessment")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn presets_returns_200() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/scenario/presets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cascade_analyze_rejects_bad_severity() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cascade/analyze?severity=1.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
