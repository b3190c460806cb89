//! Cascading Risk Inference Engine.
//!
//! A directed probabilistic chain, not an ensemble:
//!
//! ```text
//! environmental metrics ──► P(env)
//!                             │ p_high injected as a health feature
//!                             ▼
//! health metrics ──────────► P(health | P_env)
//!
//! food metrics ────────────► P(food)        (independent, parallel)
//! ```
//!
//! The engine then aggregates a resilience score from the three
//! probability-of-high values and scores per-domain confidence from a
//! negentropy/margin blend. Stateless; never retries — any classifier
//! failure is fatal to the request and the caller decides.

mod explain;

pub use explain::causal_explanations;

use std::time::Instant;

use chrono::Utc;
use tracing::debug;

use crate::config::defaults::{
    AQI_OVERRIDE_DISTRIBUTION, CROP_SUPPLY_OVERRIDE_DISTRIBUTION, OVERRIDE_CONFIDENCE,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::RiskModels;
use crate::preprocess::{self, Prepared};
use crate::types::{
    CascadeInfo, DomainAssessment, DomainConfidence, MetricBag, PredictionRecord,
    RiskDistribution,
};

/// The cascading inference engine. Construct once at startup and share.
#[derive(Debug, Clone)]
pub struct CascadingRiskEngine {
    models: RiskModels,
    cfg: EngineConfig,
}

impl CascadingRiskEngine {
    pub fn new(models: RiskModels, cfg: EngineConfig) -> Self {
        Self { models, cfg }
    }

    /// Run the full cascade on a metric bag and produce a prediction
    /// record.
    pub fn predict(&self, bag: &MetricBag) -> Result<PredictionRecord> {
        let started = Instant::now();
        let prepared = preprocess::prepare_all(bag);
        let record = self.predict_prepared(&prepared, started)?;
        Ok(record)
    }

    /// Run the cascade on already-preprocessed features.
    fn predict_prepared(&self, prepared: &Prepared, started: Instant) -> Result<PredictionRecord> {
        // Step 1: environmental risk. Beyond the training support the
        // classifier extrapolates poorly; past the AQI threshold the
        // distribution is pinned instead.
        let (env_dist, env_confidence) = if prepared.env.aqi > self.cfg.aqi_override_threshold {
            let (low, medium, high) = AQI_OVERRIDE_DISTRIBUTION;
            debug!(aqi = prepared.env.aqi, "AQI beyond training support, pinning env to high");
            (RiskDistribution::new(low, medium, high), OVERRIDE_CONFIDENCE)
        } else {
            let (_, dist) = self.models.predict_environmental(&prepared.env)?;
            (dist, self.confidence(&dist))
        };
        let env_high_prob = env_dist.high;

        // Step 2: health risk, conditioned on the environmental
        // probability-of-high. This injection is the cascade.
        let mut health_features = prepared.health;
        health_features.environmental_risk_prob = env_high_prob;
        let (_, health_dist) = self.models.predict_health(&health_features)?;
        let health_confidence = self.confidence(&health_dist);

        // Step 3: food security, independent of the other two.
        let (food_dist, food_confidence) =
            if prepared.food.crop_supply_index < self.cfg.crop_supply_override_threshold {
                let (low, medium, high) = CROP_SUPPLY_OVERRIDE_DISTRIBUTION;
                debug!(
                    crop_supply = prepared.food.crop_supply_index,
                    "Crop supply below survival threshold, pinning food to high"
                );
                (RiskDistribution::new(low, medium, high), OVERRIDE_CONFIDENCE)
            } else {
                let (_, dist) = self.models.predict_food(&prepared.food)?;
                (dist, self.confidence(&dist))
            };

        // Step 4: resilience aggregation.
        let resilience_score =
            self.resilience_score(env_high_prob, health_dist.high, food_dist.high);

        let inference_duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            resilience = resilience_score,
            elapsed_ms = inference_duration_ms,
            "Cascading inference complete"
        );

        Ok(PredictionRecord {
            timestamp: Utc::now(),
            environmental: DomainAssessment::from_distribution(env_dist),
            health: DomainAssessment::from_distribution(health_dist),
            food_security: DomainAssessment::from_distribution(food_dist),
            resilience_score,
            confidence: DomainConfidence {
                environmental: env_confidence,
                health: health_confidence,
                food_security: food_confidence,
            },
            overall_confidence: None,
            inference_duration_ms,
            cascade_info: CascadeInfo {
                env_prob_injected_into_health: env_high_prob,
                description: format!(
                    "Environmental risk probability ({:.2}%) was used as input to the health model",
                    env_high_prob * 100.0
                ),
            },
            assumptions: prepared.assumptions.clone(),
        })
    }

    /// Resilience score: `round(100·(1 − Σ wᵢ·P_high,ᵢ))`, clamped to
    /// `[0, 100]`.
    fn resilience_score(&self, env_high: f64, health_high: f64, food_high: f64) -> u8 {
        let weighted_risk = self.cfg.resilience_weight_env * env_high
            + self.cfg.resilience_weight_health * health_high
            + self.cfg.resilience_weight_food * food_high;
        let resilience = (100.0 * (1.0 - weighted_risk)).round();
        resilience.clamp(0.0, 100.0) as u8
    }

    /// Confidence: weighted blend of normalized negentropy
    /// `1 − H(p)/ln 3` and the top-two margin, rounded to three decimals.
    fn confidence(&self, dist: &RiskDistribution) -> f64 {
        // Floor and renormalize so a degenerate input cannot produce ln(0).
        let probs = [
            dist.low.max(1e-10),
            dist.medium.max(1e-10),
            dist.high.max(1e-10),
        ];
        let total: f64 = probs.iter().sum();
        let normalized = RiskDistribution::new(probs[0] / total, probs[1] / total, probs[2] / total);

        let negentropy = 1.0 - normalized.entropy() / 3.0_f64.ln();
        let margin = normalized.margin();
        let blended = self.cfg.confidence_weight_negentropy * negentropy
            + self.cfg.confidence_weight_margin * margin;
        (blended * 1000.0).round() / 1000.0
    }
}
