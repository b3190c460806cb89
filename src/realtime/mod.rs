//! Real-time state management and prediction fan-out.
//!
//! The [`RealtimeStateManager`] owns the per-domain slots, the rolling
//! prediction history, the inference rate gate, and the subscriber set.
//! All other components are stateless; everything here is reachable from
//! the ingest and subscription endpoints.

mod state_manager;
mod subscribers;

pub use state_manager::{InferenceOutcome, RealtimeStateManager};
pub use subscribers::{SubscriberPhase, SubscriberRegistry};
