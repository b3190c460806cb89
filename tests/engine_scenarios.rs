//! End-to-end inference scenarios over the cascading engine.

use civitas::config::EngineConfig;
use civitas::engine::CascadingRiskEngine;
use civitas::model::RiskModels;
use civitas::types::{MetricBag, RiskLevel};

fn engine() -> CascadingRiskEngine {
    CascadingRiskEngine::new(RiskModels::pretrained().unwrap(), EngineConfig::default())
}

/// Acute stress: simultaneous environmental, health, and food pressure.
#[test]
fn acute_stress_cascade() {
    let bag = MetricBag {
        aqi: Some(180.0),
        traffic_density: Some(2.0),
        temperature: Some(38.0),
        rainfall: Some(5.0),
        hospital_load: Some(0.82),
        respiratory_cases: Some(450.0),
        crop_supply_index: Some(58.0),
        food_price_index: Some(135.0),
        supply_disruption_events: Some(3.0),
        ..MetricBag::default()
    };
    let record = engine().predict(&bag).unwrap();

    assert_eq!(record.environmental.risk_level, RiskLevel::High);
    assert!(record.environmental.probability_of_high >= 0.60);

    assert_eq!(record.health.risk_level, RiskLevel::High);
    assert!(record.health.probability_of_high >= 0.60);

    assert_eq!(
        record.cascade_info.env_prob_injected_into_health,
        record.environmental.probability_of_high
    );

    assert!(record.resilience_score <= 50, "resilience {}", record.resilience_score);

    for confidence in [
        record.confidence.environmental,
        record.confidence.health,
        record.confidence.food_security,
    ] {
        assert!((0.0..=1.0).contains(&confidence));
    }
}

/// Calm baseline: low inputs across the board.
#[test]
fn calm_baseline() {
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
    let record = engine().predict(&bag).unwrap();

    assert_eq!(record.environmental.risk_level, RiskLevel::Low);
    assert!(record.resilience_score >= 60, "resilience {}", record.resilience_score);
}

/// Threshold overrides: extreme inputs pin the distributions exactly.
#[test]
fn threshold_overrides() {
    let e = engine();

    let record = e
        .predict(&MetricBag { aqi: Some(350.0), ..MetricBag::default() })
        .unwrap();
    let env = record.environmental.distribution;
    assert_eq!((env.low, env.medium, env.high), (0.02, 0.08, 0.90));
    assert_eq!(record.confidence.environmental, 0.99);

    let record = e
        .predict(&MetricBag { crop_supply_index: Some(20.0), ..MetricBag::default() })
        .unwrap();
    assert_eq!(record.food_security.risk_level, RiskLevel::High);
    assert_eq!(record.food_security.distribution.high, 0.95);
    assert_eq!(record.confidence.food_security, 0.99);
}

/// Resilience equals the fixed weighted formula for arbitrary inputs.
#[test]
fn resilience_formula_holds_across_grid() {
    let e = engine();
    for aqi in [20.0, 100.0, 180.0, 260.0, 340.0] {
        for load in [0.3, 0.6, 0.9] {
            let bag = MetricBag {
                aqi: Some(aqi),
                hospital_load: Some(load),
                crop_supply_index: Some(aqi / 4.0),
                ..MetricBag::default()
            };
            let record = e.predict(&bag).unwrap();
            let expected = (100.0
                * (1.0
                    - 0.35 * record.environmental.probability_of_high
                    - 0.40 * record.health.probability_of_high
                    - 0.25 * record.food_security.probability_of_high))
                .round()
                .clamp(0.0, 100.0) as u8;
            assert_eq!(record.resilience_score, expected, "aqi={aqi} load={load}");
        }
    }
}

/// Identical inputs and weights produce identical outputs.
#[test]
fn end_to_end_determinism() {
    let bag = MetricBag {
        aqi: Some(137.5),
        traffic_density: Some(1.0),
        temperature: Some(303.0), // Kelvin, auto-converted
        hospital_load: Some(71.0), // percent, auto-converted
        respiratory_cases: Some(220.0),
        crop_supply_index: Some(66.0),
        ..MetricBag::default()
    };
    let a = engine().predict(&bag).unwrap();
    let b = engine().predict(&bag).unwrap();

    assert_eq!(a.environmental.distribution, b.environmental.distribution);
    assert_eq!(a.health.distribution, b.health.distribution);
    assert_eq!(a.food_security.distribution, b.food_security.distribution);
    assert_eq!(a.resilience_score, b.resilience_score);
    assert_eq!(a.assumptions, b.assumptions);
}
