//! Scenario endpoints: delta simulation, policy simulation, cascade
//! analysis, and the preset table.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::api::envelope;
use crate::error::ServiceError;
use crate::scenario;
use crate::types::{
    CascadeSystem, MetricBag, MetricDeltas, ScenarioOutcome, SimulationValidation,
};

use super::{ServiceState, DEFAULT_LOCALITY};

// ============================================================================
// Delta-based simulation
// ============================================================================

/// POST /api/v1/scenario/simulate request body.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub locality: Option<String>,
    #[serde(alias = "preset_id")]
    pub preset: Option<String>,
    pub custom_prompt: Option<String>,
    #[serde(alias = "explicit_deltas")]
    pub custom_deltas: Option<MetricDeltas>,
}

/// POST /api/v1/scenario/simulate — apply deltas to the live baseline and
/// re-score with the cascade.
pub async fn simulate_scenario(
    State(state): State<ServiceState>,
    Json(request): Json<SimulateRequest>,
) -> Response {
    let locality = request.locality.as_deref().unwrap_or(DEFAULT_LOCALITY);
    let baseline = state.warehouse.fetch(locality).await;
    let now = Utc::now();

    let resolved = match scenario::resolve_deltas(
        request.custom_deltas,
        request.custom_prompt.as_deref(),
        request.preset.as_deref(),
    ) {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    let scenario_baseline = baseline.to_scenario_baseline();
    let simulated = scenario::apply_to_baseline(&scenario_baseline, &resolved.deltas);

    // Score the simulated bag. Hospital load is percent-scaled here; the
    // preprocessor converts it at the cascade boundary.
    let simulated_bag = MetricBag {
        aqi: Some(simulated.aqi),
        temperature: Some(simulated.temperature),
        hospital_load: Some(simulated.hospital_load),
        crop_supply_index: Some(simulated.crop_supply),
        ..MetricBag::default()
    };
    let risks = match state.engine.predict(&simulated_bag) {
        Ok(risks) => risks,
        Err(err) => return err.into_response(),
    };

    let used_live_data = baseline.overall_freshness(now).is_current();
    info!(
        locality = %baseline.locality,
        source = ?resolved.source,
        used_live_data,
        "Scenario simulation complete"
    );

    envelope::ok(ScenarioOutcome {
        baseline: scenario_baseline,
        deltas: resolved,
        simulated,
        risks,
        validation: SimulationValidation {
            used_live_data,
            fallback_used: !used_live_data,
            deltas_applied: true,
            ml_executed: true,
        },
        timestamp: now,
    })
}

// ============================================================================
// Policy-based simulation
// ============================================================================

/// POST /api/v1/scenario/policy request body.
#[derive(Debug, Deserialize)]
pub struct PolicyRequest {
    pub locality: Option<String>,
    pub modifications: BTreeMap<String, f64>,
}

/// POST /api/v1/scenario/policy — apply named interventions and report
/// per-domain deltas against the baseline.
pub async fn simulate_policy(
    State(state): State<ServiceState>,
    Json(request): Json<PolicyRequest>,
) -> Response {
    let locality = request.locality.as_deref().unwrap_or(DEFAULT_LOCALITY);
    let baseline = state.warehouse.fetch(locality).await;
    let bag = baseline.to_metric_bag();

    match scenario::run_policy_scenario(&state.engine, &bag, &request.modifications) {
        Ok(outcome) => envelope::ok(outcome),
        Err(err) => err.into_response(),
    }
}

// ============================================================================
// Cascade analysis
// ============================================================================

/// GET /api/v1/cascade/analyze query parameters.
#[derive(Debug, Deserialize)]
pub struct CascadeQuery {
    pub trigger_system: Option<String>,
    pub severity: Option<f64>,
}

/// GET /api/v1/cascade/analyze — three-stage propagation over the fixed
/// system graph.
pub async fn analyze_cascade(Query(query): Query<CascadeQuery>) -> Response {
    let trigger = match query.trigger_system.as_deref().unwrap_or("environmental") {
        "environmental" | "env" => CascadeSystem::Environmental,
        "health" => CascadeSystem::Health,
        "food" => CascadeSystem::Food,
        "economy" => CascadeSystem::Economy,
        other => {
            return ServiceError::validation(format!("unknown trigger system: {other}"))
                .into_response()
        }
    };
    let severity = query.severity.unwrap_or(0.75);

    match scenario::analyze_cascade(trigger, severity) {
        Ok(analysis) => envelope::ok(analysis),
        Err(err) => err.into_response(),
    }
}

// ============================================================================
// Presets
// ============================================================================

/// GET /api/v1/scenario/presets — the fixed preset table.
pub async fn get_presets() -> Response {
    envelope::ok(scenario::presets())
}
