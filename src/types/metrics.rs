//! Metric bags, preprocessed feature records, and data freshness

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Permissive external metric shape: every field optional, unknown JSON
/// fields ignored. The preprocessor turns this into the closed per-domain
/// feature records below; nothing optional crosses that boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBag {
    // Environmental
    pub aqi: Option<f64>,
    /// Ordinal 0/1/2 (low/medium/high congestion).
    pub traffic_density: Option<f64>,
    /// Celsius; Kelvin inputs are auto-detected and converted.
    pub temperature: Option<f64>,
    pub rainfall: Option<f64>,
    pub humidity: Option<f64>,
    // Health
    /// Ratio in `[0, 1]`; percent inputs (> 1) are auto-detected.
    pub hospital_load: Option<f64>,
    pub respiratory_cases: Option<f64>,
    // Food
    pub price_volatility: Option<f64>,
    pub crop_supply_index: Option<f64>,
    pub food_price_index: Option<f64>,
    pub supply_disruption_events: Option<f64>,
}

/// Closed environmental feature record. Feature ordering is fixed and
/// shared with the environmental classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvFeatures {
    pub aqi: f64,
    pub traffic_density: f64,
    pub temperature: f64,
    pub rainfall: f64,
}

impl EnvFeatures {
    pub fn as_vector(&self) -> [f64; 4] {
        [self.aqi, self.traffic_density, self.temperature, self.rainfall]
    }
}

/// Closed health feature record. `environmental_risk_prob` is supplied by
/// the cascade, never by callers; the preprocessor seeds it with 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthFeatures {
    pub aqi: f64,
    pub hospital_load: f64,
    pub respiratory_cases: f64,
    pub temperature: f64,
    pub environmental_risk_prob: f64,
}

impl HealthFeatures {
    pub fn as_vector(&self) -> [f64; 5] {
        [
            self.aqi,
            self.hospital_load,
            self.respiratory_cases,
            self.temperature,
            self.environmental_risk_prob,
        ]
    }
}

/// Closed food-security feature record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodFeatures {
    pub crop_supply_index: f64,
    pub food_price_index: f64,
    pub rainfall: f64,
    pub temperature: f64,
    pub supply_disruption_events: f64,
}

impl FoodFeatures {
    pub fn as_vector(&self) -> [f64; 5] {
        [
            self.crop_supply_index,
            self.food_price_index,
            self.rainfall,
            self.temperature,
            self.supply_disruption_events,
        ]
    }
}

/// What the preprocessor did to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionKind {
    /// Missing or unparseable value replaced with the domain default.
    Defaulted,
    /// Unit auto-detection fired (Kelvin→Celsius, percent→ratio).
    ConvertedUnits,
    /// Value clipped to the field's valid range.
    Clipped,
}

/// One substitution, unit conversion, or clip applied during preprocessing.
/// Non-fatal; accompanies every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumption {
    pub field: String,
    pub kind: AssumptionKind,
    pub detail: String,
}

impl Assumption {
    pub fn new(field: &str, kind: AssumptionKind, detail: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            detail: detail.into(),
        }
    }
}

/// Age class of a stored observation relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Live,
    Recent,
    Cached,
    Estimated,
}

impl Freshness {
    /// Classify an observation timestamp. `None` is always `Estimated`.
    ///
    /// Ladder: live < 1 h, recent < 24 h, cached < 7 d, estimated otherwise.
    pub fn from_timestamp(observed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(ts) = observed_at else {
            return Freshness::Estimated;
        };
        let age = now.signed_duration_since(ts);
        if age < Duration::hours(1) {
            Freshness::Live
        } else if age < Duration::hours(24) {
            Freshness::Recent
        } else if age < Duration::days(7) {
            Freshness::Cached
        } else {
            Freshness::Estimated
        }
    }

    /// Snapshot-endpoint confidence for this freshness class.
    pub fn confidence(&self) -> f64 {
        match self {
            Freshness::Live => 0.95,
            Freshness::Recent => 0.85,
            Freshness::Cached => 0.60,
            Freshness::Estimated => 0.35,
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Freshness::Live | Freshness::Recent)
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Freshness::Live => write!(f, "live"),
            Freshness::Recent => write!(f, "recent"),
            Freshness::Cached => write!(f, "cached"),
            Freshness::Estimated => write!(f, "estimated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_bag_ignores_unknown_fields() {
        let bag: MetricBag =
            serde_json::from_str(r#"{"aqi": 120.0, "wind_speed": 14.0}"#).unwrap();
        assert_eq!(bag.aqi, Some(120.0));
        assert_eq!(bag.temperature, None);
    }

    #[test]
    fn freshness_ladder() {
        let now = Utc::now();
        let label = |mins: i64| {
            Freshness::from_timestamp(Some(now - Duration::minutes(mins)), now)
        };
        assert_eq!(label(5), Freshness::Live);
        assert_eq!(label(90), Freshness::Recent);
        assert_eq!(label(60 * 48), Freshness::Cached);
        assert_eq!(label(60 * 24 * 8), Freshness::Estimated);
        assert_eq!(Freshness::from_timestamp(None, now), Freshness::Estimated);
    }

    #[test]
    fn freshness_is_monotone_in_age() {
        let now = Utc::now();
        let ranks: Vec<u8> = (0..(10 * 24))
            .map(|h| {
                match Freshness::from_timestamp(Some(now - Duration::hours(h)), now) {
                    Freshness::Live => 0,
                    Freshness::Recent => 1,
                    Freshness::Cached => 2,
                    Freshness::Estimated => 3,
                }
            })
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }
}
