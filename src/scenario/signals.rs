//! Deterministic natural-language → scenario-signal extraction.
//!
//! Case-folded substring matching against fixed keyword sets. Primary
//! events and secondary impacts accumulate (multi-select); severity and
//! duration take the first matching level; extraction confidence counts
//! matches across the two multi-select fields. No randomness, no external
//! lookups: same prompt, same signals.

use crate::types::{
    EventDuration, ExtractionConfidence, PrimaryEvent, ScenarioSignals, SecondaryImpact, Severity,
};

const FLOOD_KEYWORDS: &[&str] = &["flood", "flooding", "heavy rain", "monsoon", "waterlogging", "deluge"];
const HEATWAVE_KEYWORDS: &[&str] = &["heatwave", "heat", "hot", "temperature spike", "scorching", "sun"];
const DROUGHT_KEYWORDS: &[&str] = &["drought", "dry", "arid", "water shortage", "no rain"];
const POLLUTION_KEYWORDS: &[&str] = &["pollution", "smog", "aqi", "air quality", "haze", "toxic"];
const CYCLONE_KEYWORDS: &[&str] = &["cyclone", "storm", "hurricane", "wind", "gale"];

const SEVERITY_HIGH: &[&str] = &["severe", "extreme", "catastrophic", "massive", "deadly", "critical", "major"];
const SEVERITY_LOW: &[&str] = &["mild", "minor", "slight", "small", "low"];
const SEVERITY_MODERATE: &[&str] = &["moderate", "medium", "average"];

const DURATION_PROLONGED: &[&str] = &["prolonged", "long", "weeks", "month", "extended", "chronic", "persistent"];
const DURATION_SHORT: &[&str] = &["short", "brief", "flash", "sudden", "day", "hour"];
const DURATION_MODERATE: &[&str] = &["moderate", "medium"];

const TRANSPORT_KEYWORDS: &[&str] = &["traffic", "transport", "road", "commute", "stuck", "jam"];
const HOSPITAL_ACCESS_KEYWORDS: &[&str] = &["hospital", "medical", "ambulance", "health", "access"];
const POWER_KEYWORDS: &[&str] = &["power", "electricity", "blackout", "outage", "light"];
const WATER_KEYWORDS: &[&str] = &["water supply", "dry tap", "drinking water"];
const FOOD_SUPPLY_KEYWORDS: &[&str] = &["food", "crop", "supply", "market", "shortage"];

fn matches_any(prompt: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| prompt.contains(kw))
}

/// Extract structured scenario signals from a free-text prompt.
pub fn extract_signals(prompt: &str) -> ScenarioSignals {
    let prompt = prompt.to_lowercase();

    let mut primary_events = Vec::new();
    for (event, keywords) in [
        (PrimaryEvent::Flood, FLOOD_KEYWORDS),
        (PrimaryEvent::Heatwave, HEATWAVE_KEYWORDS),
        (PrimaryEvent::Drought, DROUGHT_KEYWORDS),
        (PrimaryEvent::Pollution, POLLUTION_KEYWORDS),
        (PrimaryEvent::Cyclone, CYCLONE_KEYWORDS),
    ] {
        if matches_any(&prompt, keywords) {
            primary_events.push(event);
        }
    }

    // First match wins for the single-select fields; default moderate.
    let severity = if matches_any(&prompt, SEVERITY_HIGH) {
        Severity::High
    } else if matches_any(&prompt, SEVERITY_LOW) {
        Severity::Low
    } else if matches_any(&prompt, SEVERITY_MODERATE) {
        Severity::Moderate
    } else {
        Severity::Moderate
    };

    let duration = if matches_any(&prompt, DURATION_PROLONGED) {
        EventDuration::Prolonged
    } else if matches_any(&prompt, DURATION_SHORT) {
        EventDuration::Short
    } else {
        EventDuration::Moderate
    };

    let mut secondary_impacts = Vec::new();
    for (impact, keywords) in [
        (SecondaryImpact::TransportDisruption, TRANSPORT_KEYWORDS),
        (SecondaryImpact::HospitalAccessReduction, HOSPITAL_ACCESS_KEYWORDS),
        (SecondaryImpact::PowerOutage, POWER_KEYWORDS),
        (SecondaryImpact::WaterShortage, WATER_KEYWORDS),
        (SecondaryImpact::FoodSupplyDisruption, FOOD_SUPPLY_KEYWORDS),
    ] {
        if matches_any(&prompt, keywords) {
            secondary_impacts.push(impact);
        }
    }

    let match_count = primary_events.len() + secondary_impacts.len();
    let confidence = match match_count {
        0 => ExtractionConfidence::Low,
        1 => ExtractionConfidence::Medium,
        _ => ExtractionConfidence::High,
    };

    ScenarioSignals {
        primary_events: if primary_events.is_empty() {
            vec![PrimaryEvent::None]
        } else {
            primary_events
        },
        severity,
        duration,
        secondary_impacts,
        confidence,
    }
}
