//! Three-stage cascade propagation over the fixed system graph.
//!
//! ```text
//! environmental ──0.7──► health ───0.35──► economy
//!       └───────0.5──► food ──────0.40──────┘
//! ```
//!
//! Stage 1 sets the trigger severity, stage 2 fills the trigger's direct
//! successors at `severity × edge_weight`, stage 3 sums the weighted
//! stage-2 severities into their successors (clamped to 1). A system
//! counts as affected above severity 0.1.

use crate::config::defaults::CASCADE_AFFECTED_THRESHOLD;
use crate::error::{Result, ServiceError};
use crate::types::{
    CascadeAnalysis, CascadeEdge, CascadeNode, CascadeSystem, ImpactSummary, PropagationEvent,
};

/// The fixed edge set: (source, target, weight).
const EDGES: [(CascadeSystem, CascadeSystem, f64); 4] = [
    (CascadeSystem::Environmental, CascadeSystem::Health, 0.7),
    (CascadeSystem::Environmental, CascadeSystem::Food, 0.5),
    (CascadeSystem::Health, CascadeSystem::Economy, 0.35),
    (CascadeSystem::Food, CascadeSystem::Economy, 0.4),
];

const STAGE_TIMESTAMPS: [&str; 3] = ["0h", "2h", "6h"];

fn index(system: CascadeSystem) -> usize {
    CascadeSystem::ALL
        .iter()
        .position(|s| *s == system)
        .unwrap_or(0)
}

/// Simulate cascading failure propagation from a trigger system.
///
/// `severity` must lie in `[0, 1]`.
pub fn analyze_cascade(trigger: CascadeSystem, severity: f64) -> Result<CascadeAnalysis> {
    if !severity.is_finite() || !(0.0..=1.0).contains(&severity) {
        return Err(ServiceError::validation(format!(
            "trigger severity {severity} outside [0, 1]"
        )));
    }

    let mut severities = [0.0_f64; 4];
    let mut timeline = Vec::new();

    // Stage 1: trigger.
    severities[index(trigger)] = severity;
    timeline.push(PropagationEvent {
        stage: 1,
        system: trigger.id(),
        severity,
        timestamp: STAGE_TIMESTAMPS[0],
    });

    // Stage 2: direct successors of the trigger.
    let mut stage_two = Vec::new();
    for (source, target, weight) in EDGES {
        if source == trigger {
            let propagated = severity * weight;
            let slot = &mut severities[index(target)];
            *slot = slot.max(propagated);
            stage_two.push(target);
            if propagated > CASCADE_AFFECTED_THRESHOLD {
                timeline.push(PropagationEvent {
                    stage: 2,
                    system: target.id(),
                    severity: propagated,
                    timestamp: STAGE_TIMESTAMPS[1],
                });
            }
        }
    }

    // Stage 3: sum weighted stage-2 severities into their successors.
    for &downstream in &CascadeSystem::ALL {
        if downstream == trigger || stage_two.contains(&downstream) {
            continue;
        }
        let total: f64 = EDGES
            .iter()
            .filter(|(source, target, _)| stage_two.contains(source) && *target == downstream)
            .map(|(source, _, weight)| severities[index(*source)] * weight)
            .sum();
        if total > 0.0 {
            let clamped = total.min(1.0);
            severities[index(downstream)] = clamped;
            if clamped > CASCADE_AFFECTED_THRESHOLD {
                timeline.push(PropagationEvent {
                    stage: 3,
                    system: downstream.id(),
                    severity: clamped,
                    timestamp: STAGE_TIMESTAMPS[2],
                });
            }
        }
    }

    // Summarize. The affected check and the severity sum use the raw
    // values; rounding is display-only.
    let mut systems = Vec::new();
    let mut affected_count = 0;
    let mut total_severity = 0.0;
    for &system in &CascadeSystem::ALL {
        let raw = severities[index(system)];
        let affected = raw > CASCADE_AFFECTED_THRESHOLD;
        if affected {
            affected_count += 1;
            total_severity += raw;
        }
        systems.push(CascadeNode {
            id: system.id(),
            name: system.display_name(),
            severity: round2(raw),
            affected,
        });
    }

    let impact_summary = ImpactSummary {
        systems_affected: affected_count,
        cascade_stages: if affected_count > 1 { 3 } else { 1 },
        average_severity: if affected_count > 0 {
            round2(total_severity / affected_count as f64)
        } else {
            0.0
        },
        total_propagation_time: STAGE_TIMESTAMPS[2],
    };

    Ok(CascadeAnalysis {
        systems,
        edges: EDGES
            .iter()
            .map(|(source, target, weight)| CascadeEdge {
                from: source.id(),
                to: target.id(),
                weight: *weight,
            })
            .collect(),
        propagation_timeline: timeline,
        impact_summary,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severity_of(analysis: &CascadeAnalysis, id: &str) -> f64 {
        analysis
            .systems
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.severity)
            .unwrap_or(0.0)
    }

    #[test]
    fn environmental_trigger_propagates_three_stages() {
        let analysis = analyze_cascade(CascadeSystem::Environmental, 0.75).unwrap();
        assert!((severity_of(&analysis, "environmental") - 0.75).abs() < 1e-9);
        assert!((severity_of(&analysis, "health") - round2(0.75 * 0.7)).abs() < 1e-9);
        assert!((severity_of(&analysis, "food") - round2(0.75 * 0.5)).abs() < 1e-9);
        // economy = health·0.35 + food·0.4 = 0.525·0.35 + 0.375·0.4
        let expected_economy = round2(0.525 * 0.35 + 0.375 * 0.4);
        assert!((severity_of(&analysis, "economy") - expected_economy).abs() < 1e-9);

        assert_eq!(analysis.impact_summary.systems_affected, 4);
        assert_eq!(analysis.impact_summary.cascade_stages, 3);
        assert_eq!(analysis.impact_summary.total_propagation_time, "6h");
    }

    #[test]
    fn health_trigger_only_reaches_economy() {
        let analysis = analyze_cascade(CascadeSystem::Health, 0.8).unwrap();
        assert!((severity_of(&analysis, "health") - 0.8).abs() < 1e-9);
        assert!((severity_of(&analysis, "economy") - round2(0.8 * 0.35)).abs() < 1e-9);
        assert_eq!(severity_of(&analysis, "environmental"), 0.0);
        assert_eq!(severity_of(&analysis, "food"), 0.0);
    }

    #[test]
    fn economy_trigger_has_no_successors() {
        let analysis = analyze_cascade(CascadeSystem::Economy, 0.9).unwrap();
        assert_eq!(analysis.impact_summary.systems_affected, 1);
        assert_eq!(analysis.impact_summary.cascade_stages, 1);
        assert_eq!(analysis.propagation_timeline.len(), 1);
    }

    #[test]
    fn affected_check_uses_raw_severity_not_the_displayed_rounding() {
        // env 0.148 propagates health = 0.1036: above the threshold raw,
        // but the displayed value rounds down to 0.10.
        let analysis = analyze_cascade(CascadeSystem::Environmental, 0.148).unwrap();
        let health = analysis.systems.iter().find(|n| n.id == "health").unwrap();
        assert!(health.affected);
        assert!((health.severity - 0.10).abs() < 1e-9);

        // Average severity also comes from the raw values: (0.148 + 0.1036) / 2.
        assert_eq!(analysis.impact_summary.systems_affected, 2);
        assert!((analysis.impact_summary.average_severity - 0.13).abs() < 1e-9);
    }

    #[test]
    fn weak_trigger_affects_nothing_downstream() {
        let analysis = analyze_cascade(CascadeSystem::Environmental, 0.1).unwrap();
        // 0.1 × 0.7 = 0.07, below the affected threshold.
        assert_eq!(analysis.impact_summary.systems_affected, 0);
        assert_eq!(analysis.propagation_timeline.len(), 1);
    }

    #[test]
    fn out_of_range_severity_is_rejected() {
        assert!(analyze_cascade(CascadeSystem::Environmental, 1.5).is_err());
        assert!(analyze_cascade(CascadeSystem::Environmental, -0.1).is_err());
        assert!(analyze_cascade(CascadeSystem::Environmental, f64::NAN).is_err());
    }

    #[test]
    fn edge_list_is_the_fixed_graph() {
        let analysis = analyze_cascade(CascadeSystem::Environmental, 0.5).unwrap();
        assert_eq!(analysis.edges.len(), 4);
        assert!(analysis
            .edges
            .iter()
            .any(|e| e.from == "environmental" && e.to == "health" && (e.weight - 0.7).abs() < 1e-9));
    }
}
