//! Compositional delta engine for what-if scenarios.
//!
//! Converts structured scenario signals into bounded metric deltas and
//! applies them to a live baseline. Impacts from all detected primary
//! events sum; severity scales every component, duration additionally
//! scales the hospital and food components (prolonged events have a higher
//! cumulative impact there); temperature follows a per-event severity rule.
//! The base-impact and secondary-impact tables are the testable contract.

use std::collections::BTreeMap;

use crate::error::{Result, ServiceError};
use crate::types::{
    DeltaSource, EventDuration, ExtractionConfidence, FieldDelta, MetricDeltas, PrimaryEvent,
    ResolvedDeltas, ScenarioBaseline, ScenarioPreset, ScenarioSignals, SecondaryImpact, Severity,
    SimulatedMetrics,
};

use super::signals::extract_signals;

/// Base impact row for one primary event, before multipliers.
struct EventImpact {
    aqi: f64,
    hospital: f64,
    food: f64,
}

/// Canonical base impacts. AQI improves under flood/cyclone washout;
/// drought raises dust; pollution dominates AQI.
fn base_impact(event: PrimaryEvent) -> EventImpact {
    match event {
        PrimaryEvent::Flood => EventImpact { aqi: -10.0, hospital: 12.0, food: -8.0 },
        PrimaryEvent::Heatwave => EventImpact { aqi: 25.0, hospital: 15.0, food: -10.0 },
        PrimaryEvent::Pollution => EventImpact { aqi: 100.0, hospital: 10.0, food: -2.0 },
        PrimaryEvent::Drought => EventImpact { aqi: 15.0, hospital: 8.0, food: -25.0 },
        PrimaryEvent::Cyclone => EventImpact { aqi: -15.0, hospital: 20.0, food: -15.0 },
        PrimaryEvent::None => EventImpact { aqi: 0.0, hospital: 0.0, food: 0.0 },
    }
}

/// Per-event temperature rule. Severity-only; heatwaves get a 1.2× bonus
/// at high severity.
fn temperature_delta(event: PrimaryEvent, severity: Severity) -> f64 {
    match event {
        PrimaryEvent::Flood => -4.0 * severity.multiplier(),
        PrimaryEvent::Heatwave => {
            5.0 * if severity == Severity::High { 1.2 } else { 1.0 }
        }
        PrimaryEvent::Pollution => 1.0,
        PrimaryEvent::Drought => 3.0,
        PrimaryEvent::Cyclone => -3.0,
        PrimaryEvent::None => 0.0,
    }
}

/// Compose metric deltas from scenario signals, plus a short description.
pub fn compose_deltas(signals: &ScenarioSignals) -> (MetricDeltas, String) {
    let sev = signals.severity.multiplier();
    let dur = signals.duration.multiplier();

    let mut deltas = MetricDeltas::default();
    let mut events_processed = Vec::new();

    for event in signals.active_events() {
        events_processed.push(event);
        let impact = base_impact(event);
        deltas.aqi_delta += impact.aqi * sev;
        deltas.temperature_delta += temperature_delta(event, signals.severity);
        deltas.hospital_load_delta += impact.hospital * sev * dur;
        deltas.crop_supply_delta += impact.food * sev * dur;
    }

    for impact in &signals.secondary_impacts {
        match impact {
            SecondaryImpact::TransportDisruption => {
                deltas.hospital_load_delta += 15.0;
                deltas.crop_supply_delta -= 5.0;
            }
            SecondaryImpact::HospitalAccessReduction => {
                deltas.hospital_load_delta += 25.0;
            }
            SecondaryImpact::FoodSupplyDisruption => {
                deltas.crop_supply_delta -= 10.0;
            }
            SecondaryImpact::PowerOutage | SecondaryImpact::WaterShortage => {}
        }
    }

    (deltas, describe(signals, &events_processed))
}

fn describe(signals: &ScenarioSignals, events: &[PrimaryEvent]) -> String {
    let mut parts = Vec::new();
    if signals.severity != Severity::Moderate {
        parts.push(signals.severity.title().to_string());
    }
    if signals.duration != EventDuration::Moderate {
        parts.push(signals.duration.title().to_string());
    }
    if events.is_empty() {
        parts.push("Scenario".to_string());
    } else {
        parts.push(
            events
                .iter()
                .map(|e| e.title())
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    if !signals.secondary_impacts.is_empty() {
        let impacts = signals
            .secondary_impacts
            .iter()
            .map(|i| i.title())
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("causing {impacts}"));
    }
    parts.join(" ")
}

// ============================================================================
// Presets
// ============================================================================

fn canonical_signals(event: PrimaryEvent) -> ScenarioSignals {
    ScenarioSignals {
        primary_events: vec![event],
        severity: Severity::Moderate,
        duration: EventDuration::Short,
        secondary_impacts: Vec::new(),
        confidence: ExtractionConfidence::High,
    }
}

/// Signals for a named preset, or `None` for an unknown identifier.
pub fn preset_signals(id: &str) -> Option<ScenarioSignals> {
    match id {
        "flood" => Some(canonical_signals(PrimaryEvent::Flood)),
        "heatwave" => Some(canonical_signals(PrimaryEvent::Heatwave)),
        "drought" => Some(canonical_signals(PrimaryEvent::Drought)),
        "pollution" => Some(canonical_signals(PrimaryEvent::Pollution)),
        "cyclone" => Some(canonical_signals(PrimaryEvent::Cyclone)),
        // Compound failure event: no single hazard, but severe secondary
        // strain on transport and hospital access.
        "crisis" => Some(ScenarioSignals {
            primary_events: vec![PrimaryEvent::None],
            severity: Severity::High,
            duration: EventDuration::Short,
            secondary_impacts: vec![
                SecondaryImpact::TransportDisruption,
                SecondaryImpact::HospitalAccessReduction,
            ],
            confidence: ExtractionConfidence::High,
        }),
        _ => None,
    }
}

/// The full preset table with display metadata.
#[allow(clippy::unwrap_used)] // every listed id is defined in preset_signals
pub fn presets() -> Vec<ScenarioPreset> {
    [
        ("flood", "Flood", "🌊", "Simulate monsoon flooding disrupting logistics and raising hospital admissions."),
        ("heatwave", "Heatwave", "🔥", "Simulate extreme heat conditions increasing respiratory risk and energy demand."),
        ("drought", "Drought", "🏜️", "Simulate water scarcity impacting agriculture and food prices."),
        ("pollution", "Pollution Spike", "🏭", "Simulate a severe air-quality episode driving respiratory load."),
        ("cyclone", "Cyclone", "🌀", "Simulate a cyclone landfall with trauma load and supply damage."),
        ("crisis", "Urban Crisis", "⚠️", "Compound failure event: transport breakdown plus hospital access strain."),
    ]
    .into_iter()
    .map(|(id, name, icon, description)| {
        let signals = preset_signals(id).unwrap();
        let (modifications, _) = compose_deltas(&signals);
        ScenarioPreset { id, name, icon, description, signals, modifications }
    })
    .collect()
}

// ============================================================================
// Resolution & application
// ============================================================================

/// Resolve the delta set for a simulation request.
///
/// Priority: explicit custom deltas > custom prompt > named preset >
/// default (all zero). An unknown preset identifier is a validation error.
pub fn resolve_deltas(
    custom_deltas: Option<MetricDeltas>,
    custom_prompt: Option<&str>,
    preset: Option<&str>,
) -> Result<ResolvedDeltas> {
    if let Some(deltas) = custom_deltas {
        return Ok(ResolvedDeltas {
            deltas,
            source: DeltaSource::Custom,
            inferred_scenario: None,
            signals: None,
            inference_confidence: None,
            description: "Custom deltas".to_string(),
        });
    }

    if let Some(prompt) = custom_prompt {
        let signals = extract_signals(prompt);
        let (deltas, description) = compose_deltas(&signals);
        let inferred = signals
            .primary_events
            .first()
            .map(|e| e.title().to_lowercase());
        let inference_confidence = if signals.confidence == ExtractionConfidence::High {
            0.9
        } else {
            0.5
        };
        return Ok(ResolvedDeltas {
            deltas,
            source: DeltaSource::PromptInference,
            inferred_scenario: inferred,
            signals: Some(signals),
            inference_confidence: Some(inference_confidence),
            description,
        });
    }

    if let Some(id) = preset {
        let signals = preset_signals(id)
            .ok_or_else(|| ServiceError::validation(format!("unknown preset: {id}")))?;
        let (deltas, description) = compose_deltas(&signals);
        return Ok(ResolvedDeltas {
            deltas,
            source: DeltaSource::Preset,
            inferred_scenario: Some(id.to_string()),
            signals: Some(signals),
            inference_confidence: Some(1.0),
            description,
        });
    }

    let signals = ScenarioSignals {
        primary_events: vec![PrimaryEvent::None],
        severity: Severity::Moderate,
        duration: EventDuration::Moderate,
        secondary_impacts: Vec::new(),
        confidence: ExtractionConfidence::High,
    };
    let (deltas, description) = compose_deltas(&signals);
    Ok(ResolvedDeltas {
        deltas,
        source: DeltaSource::Default,
        inferred_scenario: None,
        signals: Some(signals),
        inference_confidence: None,
        description,
    })
}

/// Apply deltas to a baseline with per-field clamping.
///
/// Bounds: AQI `[0, 500]`; temperature `[-10, 55]`; hospital load
/// `[0, 100]` (percent scale on this interface); crop supply `[10, 100]`
/// (the lower floor is the survival threshold).
pub fn apply_to_baseline(baseline: &ScenarioBaseline, deltas: &MetricDeltas) -> SimulatedMetrics {
    let aqi = (baseline.aqi + deltas.aqi_delta).clamp(0.0, 500.0);
    let temperature = (baseline.temperature + deltas.temperature_delta).clamp(-10.0, 55.0);
    let hospital_load = (baseline.hospital_load + deltas.hospital_load_delta).clamp(0.0, 100.0);
    let crop_supply = (baseline.crop_supply + deltas.crop_supply_delta).clamp(10.0, 100.0);

    let mut deltas_applied = BTreeMap::new();
    deltas_applied.insert(
        "aqi".to_string(),
        FieldDelta { baseline: baseline.aqi, delta: deltas.aqi_delta, r#final: aqi },
    );
    deltas_applied.insert(
        "temperature".to_string(),
        FieldDelta {
            baseline: baseline.temperature,
            delta: deltas.temperature_delta,
            r#final: temperature,
        },
    );
    deltas_applied.insert(
        "hospital_load".to_string(),
        FieldDelta {
            baseline: baseline.hospital_load,
            delta: deltas.hospital_load_delta,
            r#final: hospital_load,
        },
    );
    deltas_applied.insert(
        "crop_supply".to_string(),
        FieldDelta {
            baseline: baseline.crop_supply,
            delta: deltas.crop_supply_delta,
            r#final: crop_supply,
        },
    );

    SimulatedMetrics { aqi, temperature, hospital_load, crop_supply, deltas_applied }
}
