//! Classifier abstraction: opaque per-domain models.
//!
//! One trained model per domain, each exposing
//! `predict_proba(features) → (risk_level, distribution)` with the feature
//! orderings fixed by the preprocessor records. The rest of the system
//! treats these as opaque; only trained parameters live here.

mod classifier;
mod pretrained;

pub use classifier::{ClassParams, GaussianNbClassifier};
pub use pretrained::RiskModels;
