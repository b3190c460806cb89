//! Request handlers and shared API state.

mod risk;
mod scenario;
mod snapshot;

pub use risk::get_risk_assessment;
pub use scenario::{
    analyze_cascade, get_presets, simulate_policy, simulate_scenario,
};
pub use snapshot::get_current_metrics;

use std::sync::Arc;

use serde::Deserialize;

use crate::engine::CascadingRiskEngine;
use crate::realtime::RealtimeStateManager;
use crate::warehouse::BaselineStore;

/// Default locality when a request names none.
pub const DEFAULT_LOCALITY: &str = "mumbai";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ServiceState {
    pub engine: Arc<CascadingRiskEngine>,
    pub realtime: Arc<RealtimeStateManager>,
    pub warehouse: Arc<dyn BaselineStore>,
}

/// Common `?locality=` query parameter.
#[derive(Debug, Deserialize)]
pub struct LocalityQuery {
    pub locality: Option<String>,
}

impl LocalityQuery {
    pub fn locality(&self) -> &str {
        self.locality.as_deref().unwrap_or(DEFAULT_LOCALITY)
    }
}
