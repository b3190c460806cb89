//! Pretrained per-domain classifier parameters.
//!
//! The parameter tables encode the class-conditional feature distributions
//! the domain models were fitted against: per-class priors and per-feature
//! Gaussian (mean, std) pairs in the fixed feature orderings. They are
//! shipped as constants so inference is fully deterministic across runs.

use super::classifier::{ClassParams, GaussianNbClassifier};
use crate::error::Result;
use crate::types::{
    EnvFeatures, FoodFeatures, HealthFeatures, RiskDistribution, RiskLevel,
};

// ============================================================================
// Environmental model: [aqi, traffic_density, temperature, rainfall]
// ============================================================================

const ENV_LOW_MEANS: [f64; 4] = [70.0, 0.6, 30.0, 30.0];
const ENV_LOW_STDS: [f64; 4] = [30.0, 0.6, 5.0, 25.0];
const ENV_MED_MEANS: [f64; 4] = [140.0, 1.2, 32.0, 20.0];
const ENV_MED_STDS: [f64; 4] = [35.0, 0.7, 5.0, 20.0];
const ENV_HIGH_MEANS: [f64; 4] = [230.0, 1.7, 34.0, 12.0];
const ENV_HIGH_STDS: [f64; 4] = [50.0, 0.5, 5.0, 15.0];

const ENV_PARAMS: [ClassParams; 3] = [
    ClassParams { prior: 0.40, means: &ENV_LOW_MEANS, std_devs: &ENV_LOW_STDS },
    ClassParams { prior: 0.38, means: &ENV_MED_MEANS, std_devs: &ENV_MED_STDS },
    ClassParams { prior: 0.22, means: &ENV_HIGH_MEANS, std_devs: &ENV_HIGH_STDS },
];

// ============================================================================
// Health model: [aqi, hospital_load, respiratory_cases, temperature,
//                environmental_risk_prob]
// ============================================================================

const HEALTH_LOW_MEANS: [f64; 5] = [80.0, 0.52, 120.0, 30.0, 0.15];
const HEALTH_LOW_STDS: [f64; 5] = [35.0, 0.10, 60.0, 5.0, 0.15];
const HEALTH_MED_MEANS: [f64; 5] = [140.0, 0.68, 260.0, 32.0, 0.40];
const HEALTH_MED_STDS: [f64; 5] = [40.0, 0.10, 90.0, 5.0, 0.20];
const HEALTH_HIGH_MEANS: [f64; 5] = [200.0, 0.84, 430.0, 34.0, 0.70];
const HEALTH_HIGH_STDS: [f64; 5] = [50.0, 0.08, 110.0, 5.0, 0.18];

const HEALTH_PARAMS: [ClassParams; 3] = [
    ClassParams { prior: 0.38, means: &HEALTH_LOW_MEANS, std_devs: &HEALTH_LOW_STDS },
    ClassParams { prior: 0.37, means: &HEALTH_MED_MEANS, std_devs: &HEALTH_MED_STDS },
    ClassParams { prior: 0.25, means: &HEALTH_HIGH_MEANS, std_devs: &HEALTH_HIGH_STDS },
];

// ============================================================================
// Food-security model: [crop_supply_index, food_price_index, rainfall,
//                       temperature, supply_disruption_events]
// ============================================================================

const FOOD_LOW_MEANS: [f64; 5] = [85.0, 95.0, 35.0, 30.0, 0.5];
const FOOD_LOW_STDS: [f64; 5] = [10.0, 15.0, 25.0, 5.0, 1.0];
const FOOD_MED_MEANS: [f64; 5] = [65.0, 120.0, 22.0, 32.0, 2.0];
const FOOD_MED_STDS: [f64; 5] = [12.0, 18.0, 20.0, 5.0, 1.5];
const FOOD_HIGH_MEANS: [f64; 5] = [45.0, 150.0, 12.0, 34.0, 4.5];
const FOOD_HIGH_STDS: [f64; 5] = [12.0, 20.0, 15.0, 5.0, 2.0];

const FOOD_PARAMS: [ClassParams; 3] = [
    ClassParams { prior: 0.40, means: &FOOD_LOW_MEANS, std_devs: &FOOD_LOW_STDS },
    ClassParams { prior: 0.38, means: &FOOD_MED_MEANS, std_devs: &FOOD_MED_STDS },
    ClassParams { prior: 0.22, means: &FOOD_HIGH_MEANS, std_devs: &FOOD_HIGH_STDS },
];

/// The three pretrained domain classifiers.
///
/// Holds only trained parameters; thread-safe and stateless with respect
/// to request content.
#[derive(Debug, Clone)]
pub struct RiskModels {
    env: GaussianNbClassifier,
    health: GaussianNbClassifier,
    food: GaussianNbClassifier,
}

impl RiskModels {
    /// Construct the pretrained models. Eager; no lazy re-init anywhere.
    pub fn pretrained() -> Result<Self> {
        Ok(Self {
            env: GaussianNbClassifier::from_params("environmental", ENV_PARAMS)?,
            health: GaussianNbClassifier::from_params("health", HEALTH_PARAMS)?,
            food: GaussianNbClassifier::from_params("food_security", FOOD_PARAMS)?,
        })
    }

    pub fn predict_environmental(
        &self,
        features: &EnvFeatures,
    ) -> Result<(RiskLevel, RiskDistribution)> {
        self.env.predict_proba(&features.as_vector())
    }

    pub fn predict_health(
        &self,
        features: &HealthFeatures,
    ) -> Result<(RiskLevel, RiskDistribution)> {
        self.health.predict_proba(&features.as_vector())
    }

    pub fn predict_food(
        &self,
        features: &FoodFeatures,
    ) -> Result<(RiskLevel, RiskDistribution)> {
        self.food.predict_proba(&features.as_vector())
    }
}
