//! Shared data structures for multi-domain risk inference
//!
//! This module defines the core types flowing through the service:
//! - Metric bags and preprocessed feature records (preprocessor boundary)
//! - Risk distributions and prediction records (inference outputs)
//! - Scenario signals, deltas, presets, and policy outcomes (what-if paths)
//! - Real-time wire shapes (ingest updates, trends, fan-out events)

mod metrics;
mod realtime;
mod risk;
mod scenario;

pub use metrics::*;
pub use realtime::*;
pub use risk::*;
pub use scenario::*;
