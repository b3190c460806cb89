//! Wire shapes for the real-time ingest and prediction streams

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::risk::PredictionRecord;

/// Domain addressed by a real-time update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    #[serde(alias = "environmental")]
    Env,
    Health,
    Food,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Env => write!(f, "env"),
            Domain::Health => write!(f, "health"),
            Domain::Food => write!(f, "food"),
        }
    }
}

/// Incoming real-time data update. Only the fields belonging to `domain`
/// are consulted; absent fields leave the slot untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RealtimeUpdate {
    pub domain: Option<Domain>,
    pub timestamp: Option<DateTime<Utc>>,
    // Environmental fields
    pub aqi: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    // Health fields
    pub hospital_load: Option<f64>,
    pub respiratory_cases: Option<f64>,
    // Food fields
    pub price_volatility: Option<f64>,
    pub supply_index: Option<f64>,
}

/// Trend direction over the rolling prediction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// One domain's trend: direction, current mean probability-of-high, and
/// change versus the older comparison window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DomainTrend {
    pub direction: TrendDirection,
    pub current: f64,
    pub change: f64,
}

/// Trend summary over the rolling history. Needs at least five recent
/// records and a non-empty older window to report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendSummary {
    Ok {
        environmental: DomainTrend,
        health: DomainTrend,
        food_security: DomainTrend,
    },
    InsufficientData {
        message: String,
    },
}

impl TrendSummary {
    pub fn insufficient() -> Self {
        TrendSummary::InsufficientData {
            message: "Need more data points".to_string(),
        }
    }
}

/// Event fanned out to every prediction subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionEvent {
    pub record: PredictionRecord,
    pub trends: TrendSummary,
}

/// Snapshot delivered to a subscriber immediately after accept.
#[derive(Debug, Clone, Serialize)]
pub struct InitialSnapshot {
    pub history: Vec<PredictionRecord>,
    pub trends: TrendSummary,
    pub latest: Option<PredictionRecord>,
}
