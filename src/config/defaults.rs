//! System-wide default constants.
//!
//! Centralises the tunable numbers of the inference and real-time
//! subsystems. Grouped by subsystem for easy discovery.

// ============================================================================
// Real-time state manager
// ============================================================================

/// Rolling prediction history capacity.
///
/// 60 records at one prediction per minute = one hour of trend context.
pub const WINDOW_SIZE: usize = 60;

/// Age (seconds) below which a domain slot counts as fully fresh.
pub const STALE_THRESHOLD_SECS: u64 = 60;

/// Maximum inference executions per second on the real-time path.
///
/// The gate rejects rather than queues; query endpoints are not gated.
pub const MAX_INFERENCE_RATE: f64 = 2.0;

/// Broadcast channel capacity for prediction fan-out.
pub const FANOUT_CHANNEL_CAPACITY: usize = 64;

/// Upper bound on a single subscriber delivery before the subscriber is
/// dropped (seconds).
pub const SUBSCRIBER_SEND_TIMEOUT_SECS: u64 = 5;

/// Records averaged for the "recent" side of a trend comparison.
pub const TREND_RECENT_WINDOW: usize = 5;

/// Upper bound of the "older" comparison window (records back from now).
pub const TREND_OLDER_WINDOW: usize = 15;

/// Probability-of-high shift below which a trend reads as stable.
pub const TREND_EPSILON: f64 = 0.05;

// ============================================================================
// Resilience & confidence
// ============================================================================

/// Resilience weight on the environmental probability-of-high.
pub const RESILIENCE_WEIGHT_ENV: f64 = 0.35;

/// Resilience weight on the health probability-of-high (highest weight:
/// public-health priority).
pub const RESILIENCE_WEIGHT_HEALTH: f64 = 0.40;

/// Resilience weight on the food-security probability-of-high.
pub const RESILIENCE_WEIGHT_FOOD: f64 = 0.25;

/// Confidence blend weight on normalized negentropy.
pub const CONFIDENCE_WEIGHT_NEGENTROPY: f64 = 0.6;

/// Confidence blend weight on the top-two class margin.
pub const CONFIDENCE_WEIGHT_MARGIN: f64 = 0.4;

// ============================================================================
// Threshold overrides
// ============================================================================
// The classifier extrapolates poorly outside its training support; beyond
// these thresholds the engine pins the distribution instead of trusting it.

/// AQI above which the environmental distribution is pinned to high.
pub const AQI_OVERRIDE_THRESHOLD: f64 = 300.0;

/// Pinned environmental distribution `(low, medium, high)`.
pub const AQI_OVERRIDE_DISTRIBUTION: (f64, f64, f64) = (0.02, 0.08, 0.90);

/// Crop supply below which the food distribution is pinned to high.
pub const CROP_SUPPLY_OVERRIDE_THRESHOLD: f64 = 30.0;

/// Pinned food-security distribution `(low, medium, high)`.
pub const CROP_SUPPLY_OVERRIDE_DISTRIBUTION: (f64, f64, f64) = (0.01, 0.04, 0.95);

/// Confidence reported alongside a pinned distribution.
pub const OVERRIDE_CONFIDENCE: f64 = 0.99;

// ============================================================================
// Preprocessor defaults & unit detection
// ============================================================================

pub const DEFAULT_AQI: f64 = 100.0;
pub const DEFAULT_TRAFFIC_DENSITY: f64 = 1.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;
pub const DEFAULT_RAINFALL_MM: f64 = 20.0;
pub const DEFAULT_HOSPITAL_LOAD: f64 = 0.5;
pub const DEFAULT_RESPIRATORY_CASES: f64 = 100.0;
pub const DEFAULT_CROP_SUPPLY_INDEX: f64 = 80.0;
pub const DEFAULT_FOOD_PRICE_INDEX: f64 = 110.0;
pub const DEFAULT_SUPPLY_DISRUPTIONS: f64 = 0.0;

/// Merged-state default for humidity (slot field, not a classifier input).
pub const DEFAULT_HUMIDITY: f64 = 60.0;

/// Merged-state default for price volatility (slot field, not a classifier
/// input).
pub const DEFAULT_PRICE_VOLATILITY: f64 = 0.1;

/// Temperatures above this are taken to be Kelvin and converted.
pub const KELVIN_DETECT_THRESHOLD: f64 = 200.0;

/// Celsius = Kelvin − this.
pub const KELVIN_OFFSET: f64 = 273.15;

// ============================================================================
// Cascade propagation graph
// ============================================================================

/// Severity below which a propagated system does not count as affected.
pub const CASCADE_AFFECTED_THRESHOLD: f64 = 0.1;

// ============================================================================
// Policy comparison
// ============================================================================

/// Overall-improvement blend weight for the environmental domain.
pub const IMPROVEMENT_WEIGHT_ENV: f64 = 0.4;

/// Overall-improvement blend weight for the health domain.
pub const IMPROVEMENT_WEIGHT_HEALTH: f64 = 0.4;

/// Overall-improvement blend weight for the food domain.
pub const IMPROVEMENT_WEIGHT_FOOD: f64 = 0.2;
