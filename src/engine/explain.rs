//! Human-readable causal explanations for risk assessments.
//!
//! Derives short factual statements from the preprocessed feature values
//! and the prediction itself. Resilience warnings lead, then per-domain
//! drivers; capped at five entries.

use crate::preprocess::Prepared;
use crate::types::PredictionRecord;

const MAX_EXPLANATIONS: usize = 5;

/// Build the explanation list for a prediction.
pub fn causal_explanations(record: &PredictionRecord, prepared: &Prepared) -> Vec<String> {
    let mut explanations = Vec::new();

    if record.resilience_score < 40 {
        explanations.push("Critical resilience - immediate intervention needed".to_string());
    } else if record.resilience_score < 60 {
        explanations.push("Moderate resilience - monitoring required".to_string());
    }

    // Environmental drivers
    let env = &prepared.env;
    if env.aqi > 200.0 {
        explanations.push(format!("Very poor air quality (AQI {:.0})", env.aqi));
    } else if env.aqi > 150.0 {
        explanations.push(format!("Poor air quality (AQI {:.0})", env.aqi));
    }
    if env.traffic_density >= 2.0 {
        explanations.push("High traffic congestion".to_string());
    }
    if env.temperature > 40.0 {
        explanations.push(format!("Extreme heat ({:.1} °C)", env.temperature));
    }

    // Health drivers
    let health = &prepared.health;
    if health.hospital_load > 0.85 {
        explanations.push(format!(
            "Critical hospital bed occupancy ({:.1}%)",
            health.hospital_load * 100.0
        ));
    } else if health.hospital_load > 0.70 {
        explanations.push(format!(
            "High hospital bed occupancy ({:.1}%)",
            health.hospital_load * 100.0
        ));
    }
    if health.respiratory_cases > 500.0 {
        explanations.push(format!(
            "High number of respiratory cases ({:.0})",
            health.respiratory_cases
        ));
    }
    if record.cascade_info.env_prob_injected_into_health > 0.6 {
        explanations.push("Environmental stress elevating health risk".to_string());
    }

    // Food drivers
    let food = &prepared.food;
    if food.crop_supply_index < 40.0 {
        explanations.push(format!("Low crop supply index ({:.1})", food.crop_supply_index));
    } else if food.crop_supply_index < 60.0 {
        explanations.push(format!("Moderate supply levels ({:.1})", food.crop_supply_index));
    }
    if food.food_price_index > 140.0 {
        explanations.push(format!("Elevated food prices (index {:.0})", food.food_price_index));
    }
    if food.supply_disruption_events >= 3.0 {
        explanations.push(format!(
            "Multiple supply disruption events ({:.0})",
            food.supply_disruption_events
        ));
    }

    if explanations.is_empty() {
        explanations.push("All indicators within acceptable ranges".to_string());
    }

    explanations.truncate(MAX_EXPLANATIONS);
    explanations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::CascadingRiskEngine;
    use crate::model::RiskModels;
    use crate::preprocess;
    use crate::types::MetricBag;

    fn explain(bag: &MetricBag) -> Vec<String> {
        let engine =
            CascadingRiskEngine::new(RiskModels::pretrained().unwrap(), EngineConfig::default());
        let record = engine.predict(bag).unwrap();
        let prepared = preprocess::prepare_all(bag);
        causal_explanations(&record, &prepared)
    }

    #[test]
    fn calm_conditions_report_acceptable_ranges() {
        let bag = MetricBag {
            aqi: Some(60.0),
            traffic_density: Some(0.0),
            temperature: Some(25.0),
            rainfall: Some(40.0),
            hospital_load: Some(0.45),
            respiratory_cases: Some(80.0),
            crop_supply_index: Some(88.0),
            food_price_index: Some(95.0),
            supply_disruption_events: Some(0.0),
            ..MetricBag::default()
        };
        let explanations = explain(&bag);
        assert_eq!(explanations, vec!["All indicators within acceptable ranges".to_string()]);
    }

    #[test]
    fn stressed_conditions_name_the_drivers() {
        let bag = MetricBag {
            aqi: Some(220.0),
            traffic_density: Some(2.0),
            hospital_load: Some(0.9),
            respiratory_cases: Some(800.0),
            crop_supply_index: Some(35.0),
            ..MetricBag::default()
        };
        let explanations = explain(&bag);
        assert!(explanations.len() <= 5);
        assert!(explanations.iter().any(|e| e.contains("air quality")));
    }

    #[test]
    fn explanation_count_is_capped() {
        let bag = MetricBag {
            aqi: Some(300.0),
            traffic_density: Some(2.0),
            temperature: Some(45.0),
            hospital_load: Some(0.95),
            respiratory_cases: Some(900.0),
            crop_supply_index: Some(32.0),
            food_price_index: Some(160.0),
            supply_disruption_events: Some(5.0),
            ..MetricBag::default()
        };
        assert!(explain(&bag).len() <= 5);
    }
}
