//! Scenario signals, deltas, presets, policy outcomes, and cascade graphs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::MetricBag;
use super::risk::PredictionRecord;

// ============================================================================
// Structured scenario signals
// ============================================================================

/// Primary hazard categories recognized by the signal extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryEvent {
    Flood,
    Heatwave,
    Drought,
    Pollution,
    Cyclone,
    /// No recognizable hazard in the prompt.
    None,
}

impl PrimaryEvent {
    pub fn title(&self) -> &'static str {
        match self {
            PrimaryEvent::Flood => "Flood",
            PrimaryEvent::Heatwave => "Heatwave",
            PrimaryEvent::Drought => "Drought",
            PrimaryEvent::Pollution => "Pollution",
            PrimaryEvent::Cyclone => "Cyclone",
            PrimaryEvent::None => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn multiplier(&self) -> f64 {
        match self {
            Severity::Low => 0.5,
            Severity::Moderate => 1.0,
            Severity::High => 1.5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDuration {
    Short,
    Moderate,
    Prolonged,
}

impl EventDuration {
    /// Applies to the hospital and food components only; prolonged events
    /// have a higher cumulative impact there.
    pub fn multiplier(&self) -> f64 {
        match self {
            EventDuration::Short => 0.8,
            EventDuration::Moderate => 1.0,
            EventDuration::Prolonged => 1.5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            EventDuration::Short => "Short",
            EventDuration::Moderate => "Moderate",
            EventDuration::Prolonged => "Prolonged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryImpact {
    TransportDisruption,
    HospitalAccessReduction,
    PowerOutage,
    WaterShortage,
    FoodSupplyDisruption,
}

impl SecondaryImpact {
    pub fn title(&self) -> &'static str {
        match self {
            SecondaryImpact::TransportDisruption => "Transport Disruption",
            SecondaryImpact::HospitalAccessReduction => "Hospital Access Reduction",
            SecondaryImpact::PowerOutage => "Power Outage",
            SecondaryImpact::WaterShortage => "Water Shortage",
            SecondaryImpact::FoodSupplyDisruption => "Food Supply Disruption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionConfidence {
    Low,
    Medium,
    High,
}

/// Closed structured description of a what-if scenario, derived
/// deterministically from free text or a preset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSignals {
    pub primary_events: Vec<PrimaryEvent>,
    pub severity: Severity,
    pub duration: EventDuration,
    pub secondary_impacts: Vec<SecondaryImpact>,
    pub confidence: ExtractionConfidence,
}

impl ScenarioSignals {
    /// Primary events that carry deltas (`none` filtered out).
    pub fn active_events(&self) -> impl Iterator<Item = PrimaryEvent> + '_ {
        self.primary_events
            .iter()
            .copied()
            .filter(|e| *e != PrimaryEvent::None)
    }
}

// ============================================================================
// Deltas
// ============================================================================

/// Signed metric changes applied to a live baseline, then clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricDeltas {
    pub aqi_delta: f64,
    pub temperature_delta: f64,
    pub hospital_load_delta: f64,
    pub crop_supply_delta: f64,
}

/// Where a delta set came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaSource {
    Custom,
    PromptInference,
    Preset,
    Default,
}

/// Delta set plus provenance, as reported in simulation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDeltas {
    #[serde(flatten)]
    pub deltas: MetricDeltas,
    pub source: DeltaSource,
    pub inferred_scenario: Option<String>,
    pub signals: Option<ScenarioSignals>,
    pub inference_confidence: Option<f64>,
    pub description: String,
}

/// Scenario-facing baseline slice: the four fields the delta engine can
/// move. `hospital_load` is on the percent (0–100) scale on this interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBaseline {
    pub aqi: f64,
    pub temperature: f64,
    pub hospital_load: f64,
    pub crop_supply: f64,
}

/// One field's baseline → delta → clamped final trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldDelta {
    pub baseline: f64,
    pub delta: f64,
    pub r#final: f64,
}

/// Simulated metric values after clamped delta application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedMetrics {
    pub aqi: f64,
    pub temperature: f64,
    pub hospital_load: f64,
    pub crop_supply: f64,
    pub deltas_applied: BTreeMap<String, FieldDelta>,
}

/// Validation flags carried by every delta-simulation response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationValidation {
    pub used_live_data: bool,
    pub fallback_used: bool,
    pub deltas_applied: bool,
    pub ml_executed: bool,
}

/// Full outcome of a delta-based scenario simulation.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub baseline: ScenarioBaseline,
    pub deltas: ResolvedDeltas,
    pub simulated: SimulatedMetrics,
    pub risks: PredictionRecord,
    pub validation: SimulationValidation,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Presets
// ============================================================================

/// Named canonical scenario with display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub signals: ScenarioSignals,
    /// Deltas the preset composes against any baseline.
    pub modifications: MetricDeltas,
}

// ============================================================================
// Policy scenarios
// ============================================================================

/// Per-domain probability-of-high deltas (`baseline − intervention`) plus
/// the resilience change (`intervention − baseline`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolicyDelta {
    pub environmental: f64,
    pub health: f64,
    pub food_security: f64,
    pub resilience_score: i16,
}

/// Per-domain percent change of probability-of-high, guarded against zero
/// baselines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolicyPercentChange {
    pub environmental: f64,
    pub health: f64,
    pub food_security: f64,
}

/// Outcome of a policy-driven counterfactual.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyOutcome {
    pub baseline: PredictionRecord,
    pub intervention: PredictionRecord,
    pub delta: PolicyDelta,
    pub percent_change: PolicyPercentChange,
    /// Weighted blend: 0.4·env + 0.4·health + 0.2·food.
    pub overall_improvement: f64,
    pub policies_applied: Vec<String>,
    pub intervention_metrics: MetricBag,
}

// ============================================================================
// Cascade propagation graph
// ============================================================================

/// Systems participating in cascade propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeSystem {
    Environmental,
    Health,
    Food,
    Economy,
}

impl CascadeSystem {
    pub const ALL: [CascadeSystem; 4] = [
        CascadeSystem::Environmental,
        CascadeSystem::Health,
        CascadeSystem::Food,
        CascadeSystem::Economy,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CascadeSystem::Environmental => "environmental",
            CascadeSystem::Health => "health",
            CascadeSystem::Food => "food",
            CascadeSystem::Economy => "economy",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CascadeSystem::Environmental => "Environmental",
            CascadeSystem::Health => "Health",
            CascadeSystem::Food => "Food",
            CascadeSystem::Economy => "Economy",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CascadeNode {
    pub id: &'static str,
    pub name: &'static str,
    pub severity: f64,
    pub affected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CascadeEdge {
    pub from: &'static str,
    pub to: &'static str,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropagationEvent {
    pub stage: u8,
    pub system: &'static str,
    pub severity: f64,
    pub timestamp: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactSummary {
    pub systems_affected: usize,
    pub cascade_stages: u8,
    pub average_severity: f64,
    pub total_propagation_time: &'static str,
}

/// Full result of a three-stage cascade propagation analysis.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeAnalysis {
    pub systems: Vec<CascadeNode>,
    pub edges: Vec<CascadeEdge>,
    pub propagation_timeline: Vec<PropagationEvent>,
    pub impact_summary: ImpactSummary,
}
