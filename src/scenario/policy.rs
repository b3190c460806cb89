//! Policy Scenario Engine.
//!
//! Applies named interventions to a baseline metric bag, re-runs the
//! cascade, and reports per-domain deltas. Interventions only touch fields
//! present in the baseline; the cascade's preprocessor fills the rest.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::defaults::{
    IMPROVEMENT_WEIGHT_ENV, IMPROVEMENT_WEIGHT_FOOD, IMPROVEMENT_WEIGHT_HEALTH,
};
use crate::engine::CascadingRiskEngine;
use crate::error::{Result, ServiceError};
use crate::types::{MetricBag, PolicyDelta, PolicyOutcome, PolicyPercentChange};

/// Intervention names accepted by the policy engine.
const KNOWN_POLICIES: [&str; 9] = [
    "traffic_reduction",
    "aqi_cap",
    "emission_control",
    "surge_capacity",
    "emergency_staffing",
    "infrastructure",
    "import_stabilization",
    "subsidy_rate",
    "supply_chain_resilience",
];

/// Apply named interventions to a copy of the baseline metrics.
///
/// Every factor is a scalar in `[0, 1]` except `aqi_cap`, which is the
/// regulatory ceiling itself (`[0, 500]`). Unknown names and out-of-range
/// factors are validation errors.
pub fn apply_interventions(
    baseline: &MetricBag,
    modifications: &BTreeMap<String, f64>,
) -> Result<MetricBag> {
    validate(modifications)?;

    let mut adjusted = baseline.clone();

    // Environmental policies
    if let Some(&reduction) = modifications.get("traffic_reduction") {
        if let Some(traffic) = adjusted.traffic_density {
            let steps = if reduction >= 0.50 {
                2.0
            } else if reduction >= 0.25 {
                1.0
            } else {
                0.0
            };
            adjusted.traffic_density = Some((traffic - steps).max(0.0));
        }
        if let Some(aqi) = adjusted.aqi {
            // Less traffic also means less pollution.
            adjusted.aqi = Some(aqi * (1.0 - 0.3 * reduction));
        }
    }
    if let Some(&cap) = modifications.get("aqi_cap") {
        if let Some(aqi) = adjusted.aqi {
            adjusted.aqi = Some(aqi.min(cap));
        }
    }
    if let Some(&factor) = modifications.get("emission_control") {
        if let Some(aqi) = adjusted.aqi {
            adjusted.aqi = Some(aqi * (1.0 - factor));
        }
    }

    // Health policies
    if let Some(&factor) = modifications.get("surge_capacity") {
        if let Some(load) = adjusted.hospital_load {
            adjusted.hospital_load = Some((load / (1.0 + factor)).clamp(0.4, 0.95));
        }
    }
    if let Some(&factor) = modifications.get("emergency_staffing") {
        if let Some(load) = adjusted.hospital_load {
            adjusted.hospital_load = Some(load * (1.0 - 0.5 * factor));
        }
    }
    if let Some(&factor) = modifications.get("infrastructure") {
        if let Some(load) = adjusted.hospital_load {
            adjusted.hospital_load = Some(load * (1.0 - 0.4 * factor));
        }
        if let Some(cases) = adjusted.respiratory_cases {
            adjusted.respiratory_cases = Some((cases * (1.0 - 0.3 * factor)).floor());
        }
    }

    // Food-security policies
    if let Some(&factor) = modifications.get("import_stabilization") {
        if let Some(supply) = adjusted.crop_supply_index {
            adjusted.crop_supply_index = Some((supply * (1.0 + factor)).min(100.0));
        }
    }
    if let Some(&factor) = modifications.get("subsidy_rate") {
        if let Some(price) = adjusted.food_price_index {
            adjusted.food_price_index = Some((price * (1.0 - factor)).max(80.0));
        }
    }
    if let Some(&factor) = modifications.get("supply_chain_resilience") {
        if let Some(events) = adjusted.supply_disruption_events {
            adjusted.supply_disruption_events = Some((events * (1.0 - 0.6 * factor)).floor());
        }
        if let Some(price) = adjusted.food_price_index {
            adjusted.food_price_index = Some(price * (1.0 - 0.2 * factor));
        }
    }

    Ok(adjusted)
}

fn validate(modifications: &BTreeMap<String, f64>) -> Result<()> {
    for (name, &value) in modifications {
        if !KNOWN_POLICIES.contains(&name.as_str()) {
            return Err(ServiceError::validation(format!("unknown policy: {name}")));
        }
        let range = if name == "aqi_cap" { 0.0..=500.0 } else { 0.0..=1.0 };
        if !value.is_finite() || !range.contains(&value) {
            return Err(ServiceError::validation(format!(
                "policy {name} value {value} outside {:?}",
                range
            )));
        }
    }
    Ok(())
}

/// Run a counterfactual policy simulation: baseline prediction,
/// intervention prediction, and the deltas between them.
pub fn run_policy_scenario(
    engine: &CascadingRiskEngine,
    baseline_metrics: &MetricBag,
    modifications: &BTreeMap<String, f64>,
) -> Result<PolicyOutcome> {
    let baseline = engine.predict(baseline_metrics)?;
    let intervention_metrics = apply_interventions(baseline_metrics, modifications)?;
    let intervention = engine.predict(&intervention_metrics)?;

    let delta = PolicyDelta {
        environmental: baseline.environmental.probability_of_high
            - intervention.environmental.probability_of_high,
        health: baseline.health.probability_of_high - intervention.health.probability_of_high,
        food_security: baseline.food_security.probability_of_high
            - intervention.food_security.probability_of_high,
        resilience_score: i16::from(intervention.resilience_score)
            - i16::from(baseline.resilience_score),
    };

    let percent_change = PolicyPercentChange {
        environmental: pct_change(
            baseline.environmental.probability_of_high,
            intervention.environmental.probability_of_high,
        ),
        health: pct_change(
            baseline.health.probability_of_high,
            intervention.health.probability_of_high,
        ),
        food_security: pct_change(
            baseline.food_security.probability_of_high,
            intervention.food_security.probability_of_high,
        ),
    };

    let overall_improvement = IMPROVEMENT_WEIGHT_ENV * percent_change.environmental
        + IMPROVEMENT_WEIGHT_HEALTH * percent_change.health
        + IMPROVEMENT_WEIGHT_FOOD * percent_change.food_security;

    debug!(
        policies = modifications.len(),
        resilience_delta = delta.resilience_score,
        "Policy scenario complete"
    );

    Ok(PolicyOutcome {
        baseline,
        intervention,
        delta,
        percent_change,
        overall_improvement: (overall_improvement * 100.0).round() / 100.0,
        policies_applied: modifications.keys().cloned().collect(),
        intervention_metrics,
    })
}

/// Percent reduction of `new` versus `baseline`, zero when the baseline
/// probability is zero.
fn pct_change(baseline: f64, new: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        ((baseline - new) / baseline) * 100.0
    }
}
