//! Current-metrics snapshot endpoint.

use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::envelope;
use crate::types::Freshness;

use super::{LocalityQuery, ServiceState};

/// Per-field freshness labels for the snapshot.
#[derive(Debug, Serialize)]
pub struct FieldFreshness {
    pub air_quality: Freshness,
    pub health: Freshness,
    pub agriculture: Freshness,
}

/// Data sources per field, derived from freshness.
#[derive(Debug, Serialize)]
pub struct FieldSources {
    pub air_quality: &'static str,
    pub health: &'static str,
    pub agriculture: &'static str,
}

/// Fully-populated snapshot for one locality. Never contains nulls.
#[derive(Debug, Serialize)]
pub struct CurrentMetricsResponse {
    pub locality: String,
    pub aqi: f64,
    pub temperature: f64,
    /// Percent scale (0–100) on this interface.
    pub hospital_load: f64,
    pub crop_supply: f64,
    pub freshness: FieldFreshness,
    pub sources: FieldSources,
    pub data_freshness: Freshness,
    pub confidence: f64,
    pub fetched_at: DateTime<Utc>,
}

/// GET /api/v1/metrics/current — latest metric bag with freshness labels
/// and overall confidence.
pub async fn get_current_metrics(
    State(state): State<ServiceState>,
    Query(query): Query<LocalityQuery>,
) -> Response {
    let baseline = state.warehouse.fetch(query.locality()).await;
    let now = Utc::now();

    let env_freshness = Freshness::from_timestamp(baseline.env_observed_at, now);
    let health_freshness = Freshness::from_timestamp(baseline.health_observed_at, now);
    let food_freshness = Freshness::from_timestamp(baseline.food_observed_at, now);

    envelope::ok(CurrentMetricsResponse {
        locality: baseline.locality.clone(),
        aqi: baseline.aqi,
        temperature: baseline.temperature,
        hospital_load: baseline.hospital_load_percent,
        crop_supply: baseline.crop_supply,
        freshness: FieldFreshness {
            air_quality: env_freshness,
            health: health_freshness,
            agriculture: food_freshness,
        },
        sources: FieldSources {
            air_quality: if env_freshness.is_current() { "sensor" } else { "historical_estimate" },
            health: if health_freshness.is_current() { "hospital_api" } else { "model_estimate" },
            agriculture: if food_freshness.is_current() { "market_data" } else { "seasonal_estimate" },
        },
        data_freshness: baseline.overall_freshness(now),
        confidence: baseline.confidence(now),
        fetched_at: now,
    })
}
