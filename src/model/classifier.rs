//! Gaussian naive-Bayes risk classifier.
//!
//! Each domain model holds per-class priors and per-feature Gaussian
//! likelihood parameters. Prediction computes the joint log-likelihood per
//! class and softmaxes into a calibrated-looking distribution over
//! `{low, medium, high}`. Deterministic: same features, same output.

use statrs::distribution::{Continuous, Normal};

use crate::error::{Result, ServiceError};
use crate::types::{RiskDistribution, RiskLevel};

/// Trained parameters for a single risk class.
#[derive(Debug, Clone, Copy)]
pub struct ClassParams {
    /// Class prior probability.
    pub prior: f64,
    /// Per-feature likelihood means, in the domain's fixed feature order.
    pub means: &'static [f64],
    /// Per-feature likelihood standard deviations.
    pub std_devs: &'static [f64],
}

/// One domain's classifier: opaque to callers beyond `predict_proba`.
#[derive(Debug, Clone)]
pub struct GaussianNbClassifier {
    name: &'static str,
    n_features: usize,
    priors: [f64; 3],
    /// Per class (low, medium, high), per feature.
    likelihoods: [Vec<Normal>; 3],
}

impl GaussianNbClassifier {
    /// Build a classifier from trained parameters, ordered
    /// `[low, medium, high]`.
    pub fn from_params(name: &'static str, params: [ClassParams; 3]) -> Result<Self> {
        let n_features = params[0].means.len();
        let prior_sum: f64 = params.iter().map(|c| c.prior).sum();
        if (prior_sum - 1.0).abs() > 0.01 {
            return Err(ServiceError::classifier(format!(
                "{name}: class priors sum to {prior_sum}, expected 1"
            )));
        }

        let mut likelihoods: [Vec<Normal>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for (class, slot) in params.iter().zip(likelihoods.iter_mut()) {
            if class.means.len() != n_features || class.std_devs.len() != n_features {
                return Err(ServiceError::classifier(format!(
                    "{name}: inconsistent parameter dimensions"
                )));
            }
            for (&mean, &std_dev) in class.means.iter().zip(class.std_devs) {
                let normal = Normal::new(mean, std_dev).map_err(|e| {
                    ServiceError::classifier(format!("{name}: invalid likelihood: {e}"))
                })?;
                slot.push(normal);
            }
        }

        Ok(Self {
            name,
            n_features,
            priors: [params[0].prior, params[1].prior, params[2].prior],
            likelihoods,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predict the class distribution for one feature vector.
    ///
    /// The returned probabilities sum to 1 and the label is the argmax
    /// class. An arity mismatch is a classifier failure, fatal to the
    /// request.
    pub fn predict_proba(&self, features: &[f64]) -> Result<(RiskLevel, RiskDistribution)> {
        if features.len() != self.n_features {
            return Err(ServiceError::classifier(format!(
                "{}: expected {} features, got {}",
                self.name,
                self.n_features,
                features.len()
            )));
        }

        let mut log_joint = [0.0_f64; 3];
        for (class, likelihoods) in self.likelihoods.iter().enumerate() {
            let mut ll = self.priors[class].ln();
            for (normal, &x) in likelihoods.iter().zip(features) {
                ll += normal.ln_pdf(x);
            }
            log_joint[class] = ll;
        }

        // Softmax with max-shift for numerical stability.
        let max = log_joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = log_joint.iter().map(|ll| (ll - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        let distribution =
            RiskDistribution::new(exps[0] / total, exps[1] / total, exps[2] / total);
        Ok((distribution.argmax(), distribution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEANS_LOW: [f64; 2] = [10.0, 1.0];
    const MEANS_MED: [f64; 2] = [20.0, 2.0];
    const MEANS_HIGH: [f64; 2] = [30.0, 3.0];
    const STDS: [f64; 2] = [5.0, 1.0];

    fn toy() -> GaussianNbClassifier {
        GaussianNbClassifier::from_params(
            "toy",
            [
                ClassParams { prior: 0.4, means: &MEANS_LOW, std_devs: &STDS },
                ClassParams { prior: 0.35, means: &MEANS_MED, std_devs: &STDS },
                ClassParams { prior: 0.25, means: &MEANS_HIGH, std_devs: &STDS },
            ],
        )
        .unwrap()
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = toy();
        for x in [0.0, 10.0, 20.0, 30.0, 100.0] {
            let (_, dist) = model.predict_proba(&[x, x / 10.0]).unwrap();
            assert!((dist.sum() - 1.0).abs() < 0.01, "sum {} at x={x}", dist.sum());
        }
    }

    #[test]
    fn label_equals_argmax() {
        let model = toy();
        let (level, dist) = model.predict_proba(&[30.0, 3.0]).unwrap();
        assert_eq!(level, dist.argmax());
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn near_class_mean_dominates() {
        let model = toy();
        let (level, dist) = model.predict_proba(&[10.0, 1.0]).unwrap();
        assert_eq!(level, RiskLevel::Low);
        assert!(dist.low > 0.8);
    }

    #[test]
    fn arity_mismatch_is_classifier_failure() {
        let model = toy();
        let err = model.predict_proba(&[1.0]).unwrap_err();
        assert!(matches!(err, ServiceError::Classifier(_)));
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = toy();
        let a = model.predict_proba(&[17.0, 1.8]).unwrap();
        let b = model.predict_proba(&[17.0, 1.8]).unwrap();
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn bad_priors_rejected() {
        let result = GaussianNbClassifier::from_params(
            "bad",
            [
                ClassParams { prior: 0.9, means: &MEANS_LOW, std_devs: &STDS },
                ClassParams { prior: 0.9, means: &MEANS_MED, std_devs: &STDS },
                ClassParams { prior: 0.9, means: &MEANS_HIGH, std_devs: &STDS },
            ],
        );
        assert!(result.is_err());
    }
}
