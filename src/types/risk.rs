//! Risk levels, probability distributions, and prediction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::Assumption;

/// Ordered risk classification shared by all three domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Probability distribution over the three risk classes.
///
/// Invariant: components are non-negative and sum to 1 within 0.01.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl RiskDistribution {
    pub const fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    pub fn sum(&self) -> f64 {
        self.low + self.medium + self.high
    }

    /// Class with the highest probability. Ties resolve toward the more
    /// severe class so a degenerate distribution never under-reports.
    pub fn argmax(&self) -> RiskLevel {
        let mut level = RiskLevel::Low;
        let mut best = self.low;
        if self.medium >= best {
            level = RiskLevel::Medium;
            best = self.medium;
        }
        if self.high >= best {
            level = RiskLevel::High;
        }
        level
    }

    /// Difference between the top two class probabilities.
    pub fn margin(&self) -> f64 {
        let mut probs = [self.low, self.medium, self.high];
        probs.sort_by(|a, b| b.total_cmp(a));
        probs[0] - probs[1]
    }

    /// Shannon entropy in nats, with probabilities floored to avoid ln(0).
    pub fn entropy(&self) -> f64 {
        [self.low, self.medium, self.high]
            .iter()
            .map(|p| {
                let p = p.max(1e-10);
                -p * p.ln()
            })
            .sum()
    }
}

/// One domain's slice of a prediction: class, probability of the `high`
/// class, and the full distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAssessment {
    pub risk_level: RiskLevel,
    pub probability_of_high: f64,
    pub distribution: RiskDistribution,
}

impl DomainAssessment {
    pub fn from_distribution(distribution: RiskDistribution) -> Self {
        Self {
            risk_level: distribution.argmax(),
            probability_of_high: distribution.high,
            distribution,
        }
    }
}

/// Per-domain confidence scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DomainConfidence {
    pub environmental: f64,
    pub health: f64,
    pub food_security: f64,
}

/// Provenance of the environmental→health cascade step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeInfo {
    /// The environmental probability-of-high that was injected into the
    /// health feature vector. Always equals the env assessment's
    /// `probability_of_high`.
    pub env_prob_injected_into_health: f64,
    pub description: String,
}

/// Immutable, timestamped output of one cascading inference run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub environmental: DomainAssessment,
    pub health: DomainAssessment,
    pub food_security: DomainAssessment,
    /// Aggregate resilience, integer in `[0, 100]`.
    pub resilience_score: u8,
    pub confidence: DomainConfidence,
    /// Data-freshness confidence attached by the real-time state manager.
    /// `None` on query-path predictions, which have no stored observations
    /// to be stale.
    pub overall_confidence: Option<f64>,
    pub inference_duration_ms: f64,
    pub cascade_info: CascadeInfo,
    pub assumptions: Vec<Assumption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn argmax_picks_dominant_class() {
        let d = RiskDistribution::new(0.1, 0.2, 0.7);
        assert_eq!(d.argmax(), RiskLevel::High);

        let d = RiskDistribution::new(0.8, 0.15, 0.05);
        assert_eq!(d.argmax(), RiskLevel::Low);
    }

    #[test]
    fn argmax_ties_resolve_upward() {
        let d = RiskDistribution::new(0.5, 0.5, 0.0);
        assert_eq!(d.argmax(), RiskLevel::Medium);
    }

    #[test]
    fn margin_is_top_two_gap() {
        let d = RiskDistribution::new(0.2, 0.3, 0.5);
        assert!((d.margin() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn entropy_peaks_at_uniform() {
        let uniform = RiskDistribution::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
        let peaked = RiskDistribution::new(0.01, 0.01, 0.98);
        assert!(uniform.entropy() > peaked.entropy());
        assert!((uniform.entropy() - 3.0_f64.ln()).abs() < 1e-9);
    }
}
