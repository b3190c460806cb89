//! Service configuration loaded from TOML.
//!
//! Every field has a built-in default matching `config::defaults`, so an
//! absent or partial file is always valid. Subsystems receive their slice
//! of this struct by value at construction; nothing reads the global
//! config from a hot path.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub realtime: RealtimeConfig,
}

impl ServiceConfig {
    /// Load configuration from the `CIVITAS_CONFIG` path, else
    /// `civitas.toml` in the working directory, else built-in defaults.
    pub fn load() -> Self {
        let path = std::env::var("CIVITAS_CONFIG")
            .unwrap_or_else(|_| "civitas.toml".to_string());

        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str::<ServiceConfig>(&raw) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded service configuration");
                    cfg
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config file found, using built-in defaults");
                Self::default()
            }
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP/WS server.
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Cascading-inference settings: resilience weights, confidence blend, and
/// out-of-support override thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub resilience_weight_env: f64,
    pub resilience_weight_health: f64,
    pub resilience_weight_food: f64,
    pub confidence_weight_negentropy: f64,
    pub confidence_weight_margin: f64,
    pub aqi_override_threshold: f64,
    pub crop_supply_override_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resilience_weight_env: defaults::RESILIENCE_WEIGHT_ENV,
            resilience_weight_health: defaults::RESILIENCE_WEIGHT_HEALTH,
            resilience_weight_food: defaults::RESILIENCE_WEIGHT_FOOD,
            confidence_weight_negentropy: defaults::CONFIDENCE_WEIGHT_NEGENTROPY,
            confidence_weight_margin: defaults::CONFIDENCE_WEIGHT_MARGIN,
            aqi_override_threshold: defaults::AQI_OVERRIDE_THRESHOLD,
            crop_supply_override_threshold: defaults::CROP_SUPPLY_OVERRIDE_THRESHOLD,
        }
    }
}

/// Real-time state manager settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Rolling prediction history capacity.
    pub window_size: usize,
    /// Age (seconds) below which a slot counts as fully fresh.
    pub stale_threshold_secs: u64,
    /// Maximum inference executions per second; the gate rejects above it.
    pub max_inference_rate: f64,
}

impl RealtimeConfig {
    /// Minimum interval between inference runs implied by the rate.
    pub fn min_inference_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.max_inference_rate)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            window_size: defaults::WINDOW_SIZE,
            stale_threshold_secs: defaults::STALE_THRESHOLD_SECS,
            max_inference_rate: defaults::MAX_INFERENCE_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.realtime.window_size, defaults::WINDOW_SIZE);
        assert!((cfg.engine.resilience_weight_env - 0.35).abs() < 1e-12);
        assert!((cfg.engine.resilience_weight_health - 0.40).abs() < 1e-12);
        assert!((cfg.engine.resilience_weight_food - 0.25).abs() < 1e-12);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: ServiceConfig =
            toml::from_str("[realtime]\nwindow_size = 10\n").unwrap();
        assert_eq!(cfg.realtime.window_size, 10);
        assert!((cfg.realtime.max_inference_rate - 2.0).abs() < 1e-12);
        assert_eq!(cfg.server.addr, "0.0.0.0:8080");
    }

    #[test]
    fn min_interval_from_rate() {
        let cfg = RealtimeConfig::default();
        assert_eq!(
            cfg.min_inference_interval(),
            std::time::Duration::from_millis(500)
        );
    }
}
