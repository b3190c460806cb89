//! Input preprocessing: defaults, unit normalization, and range clipping.
//!
//! Turns a permissive [`MetricBag`] into closed per-domain feature records.
//! Total and deterministic: every missing or unusable value is replaced
//! with a documented default, unit mismatches are auto-detected, and every
//! output lies inside its field's valid range. Each substitution,
//! conversion, or clip is recorded as an [`Assumption`] so callers can see
//! exactly what was inferred. Valid inputs pass through unchanged.

use crate::config::defaults::{
    DEFAULT_AQI, DEFAULT_CROP_SUPPLY_INDEX, DEFAULT_FOOD_PRICE_INDEX,
    DEFAULT_HOSPITAL_LOAD, DEFAULT_RAINFALL_MM, DEFAULT_RESPIRATORY_CASES,
    DEFAULT_SUPPLY_DISRUPTIONS, DEFAULT_TEMPERATURE_C, DEFAULT_TRAFFIC_DENSITY,
    KELVIN_DETECT_THRESHOLD, KELVIN_OFFSET,
};
use crate::types::{
    Assumption, AssumptionKind, EnvFeatures, FoodFeatures, HealthFeatures, MetricBag,
};

/// All three domain records plus the combined assumptions list.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub env: EnvFeatures,
    pub health: HealthFeatures,
    pub food: FoodFeatures,
    pub assumptions: Vec<Assumption>,
}

/// Preprocess a metric bag for all three domains at once.
///
/// Assumptions for fields shared across domains (aqi, temperature,
/// rainfall) are deduplicated.
pub fn prepare_all(bag: &MetricBag) -> Prepared {
    let mut raw = Vec::new();
    let env = prepare_environmental(bag, &mut raw);
    let health = prepare_health(bag, &mut raw);
    let food = prepare_food(bag, &mut raw);

    let mut assumptions: Vec<Assumption> = Vec::with_capacity(raw.len());
    for assumption in raw {
        if !assumptions.contains(&assumption) {
            assumptions.push(assumption);
        }
    }
    Prepared {
        env,
        health,
        food,
        assumptions,
    }
}

/// Environmental slice: `[aqi, traffic_density, temperature, rainfall]`.
pub fn prepare_environmental(bag: &MetricBag, assumptions: &mut Vec<Assumption>) -> EnvFeatures {
    EnvFeatures {
        aqi: resolve("aqi", bag.aqi, DEFAULT_AQI, 0.0, 500.0, assumptions),
        traffic_density: resolve_ordinal(
            "traffic_density",
            bag.traffic_density,
            DEFAULT_TRAFFIC_DENSITY,
            2.0,
            assumptions,
        ),
        temperature: resolve_temperature(bag.temperature, assumptions),
        rainfall: resolve("rainfall", bag.rainfall, DEFAULT_RAINFALL_MM, 0.0, 200.0, assumptions),
    }
}

/// Health slice: `[aqi, hospital_load, respiratory_cases, temperature,
/// environmental_risk_prob]`. The cascade probability is seeded with 0.0;
/// only the inference engine writes it.
pub fn prepare_health(bag: &MetricBag, assumptions: &mut Vec<Assumption>) -> HealthFeatures {
    HealthFeatures {
        aqi: resolve("aqi", bag.aqi, DEFAULT_AQI, 0.0, 500.0, assumptions),
        hospital_load: resolve_hospital_load(bag.hospital_load, assumptions),
        respiratory_cases: resolve_count(
            "respiratory_cases",
            bag.respiratory_cases,
            DEFAULT_RESPIRATORY_CASES,
            10_000.0,
            assumptions,
        ),
        temperature: resolve_temperature(bag.temperature, assumptions),
        environmental_risk_prob: 0.0,
    }
}

/// Food slice: `[crop_supply_index, food_price_index, rainfall,
/// temperature, supply_disruption_events]`.
pub fn prepare_food(bag: &MetricBag, assumptions: &mut Vec<Assumption>) -> FoodFeatures {
    FoodFeatures {
        crop_supply_index: resolve(
            "crop_supply_index",
            bag.crop_supply_index,
            DEFAULT_CROP_SUPPLY_INDEX,
            0.0,
            100.0,
            assumptions,
        ),
        food_price_index: resolve(
            "food_price_index",
            bag.food_price_index,
            DEFAULT_FOOD_PRICE_INDEX,
            50.0,
            200.0,
            assumptions,
        ),
        rainfall: resolve("rainfall", bag.rainfall, DEFAULT_RAINFALL_MM, 0.0, 200.0, assumptions),
        temperature: resolve_temperature(bag.temperature, assumptions),
        supply_disruption_events: resolve_count(
            "supply_disruption_events",
            bag.supply_disruption_events,
            DEFAULT_SUPPLY_DISRUPTIONS,
            10.0,
            assumptions,
        ),
    }
}

/// Resolve a real-valued field: default on missing/non-finite, clip to
/// `[min, max]`.
fn resolve(
    field: &str,
    value: Option<f64>,
    default: f64,
    min: f64,
    max: f64,
    assumptions: &mut Vec<Assumption>,
) -> f64 {
    let value = match value {
        Some(v) if v.is_finite() => v,
        Some(_) => {
            assumptions.push(Assumption::new(
                field,
                AssumptionKind::Defaulted,
                format!("non-numeric value replaced with default {default}"),
            ));
            return default;
        }
        None => {
            assumptions.push(Assumption::new(
                field,
                AssumptionKind::Defaulted,
                format!("missing value replaced with default {default}"),
            ));
            return default;
        }
    };

    clip(field, value, min, max, assumptions)
}

/// Resolve an ordinal/count field: same as [`resolve`] but rounded to the
/// nearest integer step.
fn resolve_ordinal(
    field: &str,
    value: Option<f64>,
    default: f64,
    max: f64,
    assumptions: &mut Vec<Assumption>,
) -> f64 {
    resolve(field, value.map(f64::round), default, 0.0, max, assumptions)
}

fn resolve_count(
    field: &str,
    value: Option<f64>,
    default: f64,
    max: f64,
    assumptions: &mut Vec<Assumption>,
) -> f64 {
    resolve(field, value.map(f64::round), default, 0.0, max, assumptions)
}

/// Temperature with Kelvin auto-detection: values above 200 are treated as
/// Kelvin and shifted to Celsius before clipping to `[0, 50]`.
fn resolve_temperature(value: Option<f64>, assumptions: &mut Vec<Assumption>) -> f64 {
    let converted = match value {
        Some(t) if t.is_finite() && t > KELVIN_DETECT_THRESHOLD => {
            let celsius = t - KELVIN_OFFSET;
            assumptions.push(Assumption::new(
                "temperature",
                AssumptionKind::ConvertedUnits,
                format!("{t} K interpreted as Kelvin, converted to {celsius:.2} °C"),
            ));
            Some(celsius)
        }
        other => other,
    };
    resolve("temperature", converted, DEFAULT_TEMPERATURE_C, 0.0, 50.0, assumptions)
}

/// Hospital load with percent auto-detection: values above 1 are treated
/// as percentages and divided by 100 before clipping to `[0, 1]`.
fn resolve_hospital_load(value: Option<f64>, assumptions: &mut Vec<Assumption>) -> f64 {
    let converted = match value {
        Some(v) if v.is_finite() && v > 1.0 => {
            let ratio = v / 100.0;
            assumptions.push(Assumption::new(
                "hospital_load",
                AssumptionKind::ConvertedUnits,
                format!("{v} interpreted as percent, converted to ratio {ratio:.3}"),
            ));
            Some(ratio)
        }
        other => other,
    };
    resolve("hospital_load", converted, DEFAULT_HOSPITAL_LOAD, 0.0, 1.0, assumptions)
}

fn clip(field: &str, value: f64, min: f64, max: f64, assumptions: &mut Vec<Assumption>) -> f64 {
    let clipped = value.clamp(min, max);
    if (clipped - value).abs() > f64::EPSILON {
        assumptions.push(Assumption::new(
            field,
            AssumptionKind::Clipped,
            format!("{value} clipped to [{min}, {max}]"),
        ));
    }
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bag_yields_all_defaults() {
        let prepared = prepare_all(&MetricBag::default());
        assert_eq!(prepared.env.aqi, DEFAULT_AQI);
        assert_eq!(prepared.env.traffic_density, DEFAULT_TRAFFIC_DENSITY);
        assert_eq!(prepared.health.hospital_load, DEFAULT_HOSPITAL_LOAD);
        assert_eq!(prepared.food.crop_supply_index, DEFAULT_CROP_SUPPLY_INDEX);
        assert_eq!(prepared.health.environmental_risk_prob, 0.0);
        assert!(!prepared.assumptions.is_empty());
        assert!(prepared
            .assumptions
            .iter()
            .all(|a| a.kind == AssumptionKind::Defaulted));
    }

    #[test]
    fn valid_inputs_pass_through_unchanged() {
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
        let prepared = prepare_all(&bag);
        assert_eq!(prepared.env.aqi, 180.0);
        assert_eq!(prepared.env.temperature, 38.0);
        assert_eq!(prepared.health.hospital_load, 0.82);
        assert_eq!(prepared.food.supply_disruption_events, 3.0);
        assert!(prepared.assumptions.is_empty());
    }

    #[test]
    fn kelvin_temperatures_are_converted() {
        let bag = MetricBag {
            temperature: Some(298.15),
            ..MetricBag::default()
        };
        let mut assumptions = Vec::new();
        let env = prepare_environmental(&bag, &mut assumptions);
        assert!((env.temperature - 25.0).abs() < 1e-9);
        assert!(assumptions
            .iter()
            .any(|a| a.field == "temperature" && a.kind == AssumptionKind::ConvertedUnits));
    }

    #[test]
    fn percent_hospital_load_is_converted() {
        let bag = MetricBag {
            hospital_load: Some(82.0),
            ..MetricBag::default()
        };
        let mut assumptions = Vec::new();
        let health = prepare_health(&bag, &mut assumptions);
        assert!((health.hospital_load - 0.82).abs() < 1e-9);
        assert!(assumptions
            .iter()
            .any(|a| a.field == "hospital_load" && a.kind == AssumptionKind::ConvertedUnits));
    }

    #[test]
    fn out_of_range_values_are_clipped() {
        let bag = MetricBag {
            aqi: Some(900.0),
            rainfall: Some(-4.0),
            food_price_index: Some(10.0),
            ..MetricBag::default()
        };
        let prepared = prepare_all(&bag);
        assert_eq!(prepared.env.aqi, 500.0);
        assert_eq!(prepared.env.rainfall, 0.0);
        assert_eq!(prepared.food.food_price_index, 50.0);
        assert!(prepared
            .assumptions
            .iter()
            .any(|a| a.field == "aqi" && a.kind == AssumptionKind::Clipped));
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let bag = MetricBag {
            aqi: Some(f64::NAN),
            temperature: Some(f64::INFINITY),
            ..MetricBag::default()
        };
        let prepared = prepare_all(&bag);
        assert_eq!(prepared.env.aqi, DEFAULT_AQI);
        assert_eq!(prepared.env.temperature, DEFAULT_TEMPERATURE_C);
    }

    /// Every output field stays inside its documented range for a sweep of
    /// hostile bags.
    #[test]
    fn outputs_always_within_bounds() {
        let extremes = [
            f64::NEG_INFINITY,
            -1e9,
            -1.0,
            0.0,
            0.5,
            1.0,
            99.0,
            250.0,
            400.0,
            1e9,
            f64::NAN,
        ];
        for &v in &extremes {
            let bag = MetricBag {
                aqi: Some(v),
                traffic_density: Some(v),
                temperature: Some(v),
                rainfall: Some(v),
                hospital_load: Some(v),
                respiratory_cases: Some(v),
                crop_supply_index: Some(v),
                food_price_index: Some(v),
                supply_disruption_events: Some(v),
                ..MetricBag::default()
            };
            let p = prepare_all(&bag);
            assert!((0.0..=500.0).contains(&p.env.aqi));
            assert!((0.0..=2.0).contains(&p.env.traffic_density));
            assert!((0.0..=50.0).contains(&p.env.temperature));
            assert!((0.0..=200.0).contains(&p.env.rainfall));
            assert!((0.0..=1.0).contains(&p.health.hospital_load));
            assert!((0.0..=10_000.0).contains(&p.health.respiratory_cases));
            assert!((0.0..=100.0).contains(&p.food.crop_supply_index));
            assert!((50.0..=200.0).contains(&p.food.food_price_index));
            assert!((0.0..=10.0).contains(&p.food.supply_disruption_events));
        }
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let bag = MetricBag {
            aqi: Some(700.0),
            temperature: Some(310.0),
            hospital_load: Some(85.0),
            ..MetricBag::default()
        };
        let a = prepare_all(&bag);
        let b = prepare_all(&bag);
        assert_eq!(a.env, b.env);
        assert_eq!(a.health, b.health);
        assert_eq!(a.food, b.food);
        assert_eq!(a.assumptions, b.assumptions);
    }
}
