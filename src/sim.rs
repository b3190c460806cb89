//! In-process demo data simulator.
//!
//! Feeds randomized domain updates through the real-time path so the
//! prediction stream has live traffic without an external source. Enabled
//! with `--simulate`; never started in normal operation.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::realtime::RealtimeStateManager;
use crate::types::{Domain, RealtimeUpdate};

/// Metro-scale base conditions the simulator drifts around.
struct BaseConditions {
    aqi: f64,
    temperature: f64,
    humidity: f64,
    hospital_load: f64,
    respiratory_cases: f64,
    price_volatility: f64,
    supply_index: f64,
}

impl Default for BaseConditions {
    fn default() -> Self {
        Self {
            aqi: 180.0,
            temperature: 28.0,
            humidity: 65.0,
            hospital_load: 0.65,
            respiratory_cases: 120.0,
            price_volatility: 0.12,
            supply_index: 85.0,
        }
    }
}

/// Randomized update generator over the ingest path.
pub struct IngestSimulator {
    rng: StdRng,
    aqi_noise: Normal<f64>,
    temp_noise: Normal<f64>,
    base: BaseConditions,
}

impl IngestSimulator {
    pub fn new(seed: u64) -> Result<Self> {
        let aqi_noise = Normal::new(0.0, 12.0)
            .map_err(|e| ServiceError::classifier(format!("simulator noise model: {e}")))?;
        let temp_noise = Normal::new(0.0, 1.5)
            .map_err(|e| ServiceError::classifier(format!("simulator noise model: {e}")))?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            aqi_noise,
            temp_noise,
            base: BaseConditions::default(),
        })
    }

    /// Emit updates every five seconds until cancelled.
    pub async fn run(mut self, manager: Arc<RealtimeStateManager>, token: CancellationToken) {
        info!("Demo ingest simulator started");
        let mut ticker = interval(Duration::from_secs(5));
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Demo ingest simulator stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick(&manager).await;
                }
            }
        }
    }

    async fn tick(&mut self, manager: &Arc<RealtimeStateManager>) {
        // Environmental update every tick.
        let env = RealtimeUpdate {
            domain: Some(Domain::Env),
            aqi: Some((self.base.aqi + self.aqi_noise.sample(&mut self.rng)).clamp(0.0, 500.0)),
            temperature: Some(self.base.temperature + self.temp_noise.sample(&mut self.rng)),
            humidity: Some((self.base.humidity + self.rng.gen_range(-5.0..5.0)).clamp(0.0, 100.0)),
            ..RealtimeUpdate::default()
        };
        let _ = manager.apply_update(&env).await;

        // Health and food updates arrive less often.
        if self.rng.gen_bool(0.5) {
            let health = RealtimeUpdate {
                domain: Some(Domain::Health),
                hospital_load: Some(
                    (self.base.hospital_load + self.rng.gen_range(-0.1..0.1)).clamp(0.3, 1.0),
                ),
                respiratory_cases: Some(
                    (self.base.respiratory_cases + self.rng.gen_range(-15.0..15.0)).max(0.0).round(),
                ),
                ..RealtimeUpdate::default()
            };
            let _ = manager.apply_update(&health).await;
        }
        if self.rng.gen_bool(0.3) {
            let food = RealtimeUpdate {
                domain: Some(Domain::Food),
                price_volatility: Some(
                    (self.base.price_volatility + self.rng.gen_range(-0.05..0.05)).clamp(0.0, 0.5),
                ),
                supply_index: Some(
                    (self.base.supply_index + self.rng.gen_range(-5.0..5.0)).clamp(50.0, 100.0),
                ),
                ..RealtimeUpdate::default()
            };
            let _ = manager.apply_update(&food).await;
        }

        match manager.run_inference().await {
            Ok(_) => {
                // Occasionally drift the base values to create trends.
                if self.rng.gen_bool(0.1) {
                    self.base.aqi =
                        (self.base.aqi + self.rng.gen_range(-10.0..10.0)).clamp(50.0, 300.0);
                }
                if self.rng.gen_bool(0.05) {
                    self.base.hospital_load = (self.base.hospital_load
                        + self.rng.gen_range(-0.1..0.1))
                    .clamp(0.3, 0.9);
                }
            }
            Err(err) => debug!(error = %err, "Simulator inference failed"),
        }
    }
}
