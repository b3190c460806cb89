//! Risk assessment endpoint: the cascade run on a locality baseline.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::api::envelope;
use crate::engine::causal_explanations;
use crate::preprocess;
use crate::types::PredictionRecord;

use super::{LocalityQuery, ServiceState};

/// Prediction record plus locality context and explanations.
#[derive(Debug, Serialize)]
pub struct RiskAssessmentResponse {
    pub locality: String,
    #[serde(flatten)]
    pub prediction: PredictionRecord,
    pub causal_explanations: Vec<String>,
}

/// GET /api/v1/risk/assessment — per-domain risks, resilience,
/// confidences, and human-readable causal explanations.
pub async fn get_risk_assessment(
    State(state): State<ServiceState>,
    Query(query): Query<LocalityQuery>,
) -> Response {
    let baseline = state.warehouse.fetch(query.locality()).await;
    let bag = baseline.to_metric_bag();

    let prediction = match state.engine.predict(&bag) {
        Ok(prediction) => prediction,
        Err(err) => return err.into_response(),
    };

    let prepared = preprocess::prepare_all(&bag);
    let causal_explanations = causal_explanations(&prediction, &prepared);

    envelope::ok(RiskAssessmentResponse {
        locality: baseline.locality,
        prediction,
        causal_explanations,
    })
}
