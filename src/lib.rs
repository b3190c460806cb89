//! Civitas: Urban Multi-Domain Risk Intelligence
//!
//! Real-time risk inference and scenario simulation for urban conditions.
//!
//! ## Architecture
//!
//! - **Cascading Inference Engine**: env → health probabilistic cascade
//!   with parallel food scoring, resilience aggregation, and
//!   entropy-based confidence
//! - **Real-Time State Manager**: per-domain slots, freshness-driven
//!   confidence, rate-gated inference, rolling history, fan-out
//! - **Scenario Engines**: deterministic prompt→signal extraction,
//!   compositional deltas, and named policy interventions
//! - **API**: axum REST + WebSocket surface

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod realtime;
pub mod scenario;
pub mod sim;
pub mod types;
pub mod warehouse;

// Re-export the service configuration
pub use config::{EngineConfig, RealtimeConfig, ServiceConfig};

// Re-export commonly used types
pub use types::{
    Domain, Freshness, MetricBag, MetricDeltas, PredictionRecord, RealtimeUpdate,
    RiskDistribution, RiskLevel, ScenarioSignals, TrendSummary,
};

// Re-export the core components
pub use engine::CascadingRiskEngine;
pub use error::ServiceError;
pub use model::RiskModels;
pub use realtime::{InferenceOutcome, RealtimeStateManager};
pub use warehouse::{BaselineStore, SeededWarehouse};
