//! Real-Time State Manager.
//!
//! Single logical owner of the three per-domain slots, the rolling
//! prediction history, the rate-gate timestamp, and the subscriber
//! registry. Realized as shared state behind one `RwLock`; the lock is
//! never held across a classifier call or a subscriber delivery — updates
//! merge and the gate decides under the lock, the cascade runs outside it,
//! and fan-out goes through a broadcast channel that never blocks on
//! receivers.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::defaults::{
    DEFAULT_AQI, DEFAULT_CROP_SUPPLY_INDEX, DEFAULT_HOSPITAL_LOAD, DEFAULT_HUMIDITY,
    DEFAULT_PRICE_VOLATILITY, DEFAULT_RESPIRATORY_CASES, DEFAULT_TEMPERATURE_C,
    FANOUT_CHANNEL_CAPACITY, TREND_EPSILON, TREND_OLDER_WINDOW, TREND_RECENT_WINDOW,
};
use crate::config::RealtimeConfig;
use crate::engine::CascadingRiskEngine;
use crate::error::{Result, ServiceError};
use crate::types::{
    Domain, DomainTrend, InitialSnapshot, MetricBag, PredictionEvent, PredictionRecord,
    RealtimeUpdate, TrendDirection, TrendSummary,
};

use super::subscribers::SubscriberRegistry;

/// Result of a rate-gated inference attempt.
#[derive(Debug)]
pub enum InferenceOutcome {
    /// The gate rejected the run; no prediction was produced.
    RateLimited,
    /// Inference ran; the record was appended and fanned out.
    Predicted(Box<PredictionRecord>),
}

#[derive(Debug, Default, Clone)]
struct EnvSlot {
    aqi: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone)]
struct HealthSlot {
    hospital_load: Option<f64>,
    respiratory_cases: Option<f64>,
    observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone)]
struct FoodSlot {
    price_volatility: Option<f64>,
    supply_index: Option<f64>,
    observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Inner {
    env: EnvSlot,
    health: HealthSlot,
    food: FoodSlot,
    history: VecDeque<PredictionRecord>,
    latest: Option<PredictionRecord>,
    last_inference_at: Option<Instant>,
}

/// The state manager. Construct once, share via `Arc`.
pub struct RealtimeStateManager {
    engine: Arc<CascadingRiskEngine>,
    cfg: RealtimeConfig,
    inner: RwLock<Inner>,
    registry: Mutex<SubscriberRegistry>,
    events: broadcast::Sender<PredictionEvent>,
}

impl RealtimeStateManager {
    pub fn new(engine: Arc<CascadingRiskEngine>, cfg: RealtimeConfig) -> Self {
        let (events, _) = broadcast::channel(FANOUT_CHANNEL_CAPACITY);
        Self {
            engine,
            cfg,
            inner: RwLock::new(Inner {
                env: EnvSlot::default(),
                health: HealthSlot::default(),
                food: FoodSlot::default(),
                history: VecDeque::with_capacity(cfg.window_size),
                latest: None,
                last_inference_at: None,
            }),
            registry: Mutex::new(SubscriberRegistry::new()),
            events,
        }
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Merge an incoming update into its domain slot. Returns whether any
    /// field changed; unchanged merges do not re-stamp the slot.
    pub async fn apply_update(&self, update: &RealtimeUpdate) -> Result<bool> {
        let domain = update
            .domain
            .ok_or_else(|| ServiceError::validation("update is missing a domain"))?;
        let stamp = update.timestamp.unwrap_or_else(Utc::now);

        let mut inner = self.inner.write().await;
        let changed = match domain {
            Domain::Env => Self::update_environmental(&mut inner.env, update, stamp),
            Domain::Health => Self::update_health(&mut inner.health, update, stamp),
            Domain::Food => Self::update_food(&mut inner.food, update, stamp),
        };
        if changed {
            debug!(domain = %domain, "Domain slot updated");
        }
        Ok(changed)
    }

    fn update_environmental(slot: &mut EnvSlot, update: &RealtimeUpdate, stamp: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(aqi) = update.aqi {
            slot.aqi = Some(aqi);
            changed = true;
        }
        if let Some(temperature) = update.temperature {
            slot.temperature = Some(temperature);
            changed = true;
        }
        if let Some(humidity) = update.humidity {
            slot.humidity = Some(humidity);
            changed = true;
        }
        if changed {
            slot.observed_at = Some(stamp);
        }
        changed
    }

    fn update_health(slot: &mut HealthSlot, update: &RealtimeUpdate, stamp: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(load) = update.hospital_load {
            slot.hospital_load = Some(load);
            changed = true;
        }
        if let Some(cases) = update.respiratory_cases {
            slot.respiratory_cases = Some(cases);
            changed = true;
        }
        if changed {
            slot.observed_at = Some(stamp);
        }
        changed
    }

    fn update_food(slot: &mut FoodSlot, update: &RealtimeUpdate, stamp: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(volatility) = update.price_volatility {
            slot.price_volatility = Some(volatility);
            changed = true;
        }
        if let Some(supply) = update.supply_index {
            slot.supply_index = Some(supply);
            changed = true;
        }
        if changed {
            slot.observed_at = Some(stamp);
        }
        changed
    }

    // ========================================================================
    // Merged state & freshness
    // ========================================================================

    /// Merged metric bag across all slots plus the aggregate data-freshness
    /// confidence. Empty slots fall back to documented defaults.
    pub async fn merged_state(&self) -> (MetricBag, f64) {
        let inner = self.inner.read().await;
        self.merge(&inner)
    }

    fn merge(&self, inner: &Inner) -> (MetricBag, f64) {
        let bag = MetricBag {
            aqi: Some(inner.env.aqi.unwrap_or(DEFAULT_AQI)),
            temperature: Some(inner.env.temperature.unwrap_or(DEFAULT_TEMPERATURE_C)),
            humidity: Some(inner.env.humidity.unwrap_or(DEFAULT_HUMIDITY)),
            hospital_load: Some(inner.health.hospital_load.unwrap_or(DEFAULT_HOSPITAL_LOAD)),
            respiratory_cases: Some(
                inner.health.respiratory_cases.unwrap_or(DEFAULT_RESPIRATORY_CASES),
            ),
            price_volatility: Some(inner.food.price_volatility.unwrap_or(DEFAULT_PRICE_VOLATILITY)),
            crop_supply_index: Some(inner.food.supply_index.unwrap_or(DEFAULT_CROP_SUPPLY_INDEX)),
            ..MetricBag::default()
        };
        (bag, self.freshness_confidence(inner, Utc::now()))
    }

    /// Per-slot freshness ladder, averaged across the three domains.
    fn freshness_confidence(&self, inner: &Inner, now: DateTime<Utc>) -> f64 {
        let stale = self.cfg.stale_threshold_secs as i64;
        let score = |observed_at: Option<DateTime<Utc>>| -> f64 {
            let Some(ts) = observed_at else { return 0.5 };
            let age = now.signed_duration_since(ts).num_seconds();
            if age < stale {
                1.0
            } else if age < stale * 2 {
                0.8
            } else if age < stale * 5 {
                0.5
            } else {
                0.3
            }
        };
        (score(inner.env.observed_at)
            + score(inner.health.observed_at)
            + score(inner.food.observed_at))
            / 3.0
    }

    // ========================================================================
    // Rate-gated inference
    // ========================================================================

    /// Run rate-gated inference over the merged state.
    ///
    /// At most `max_inference_rate` executions per second; the gate
    /// rejects rather than queues. On success the record is appended to
    /// the rolling history and fanned out to subscribers.
    pub async fn run_inference(&self) -> Result<InferenceOutcome> {
        let min_interval = self.cfg.min_inference_interval();

        // Gate + snapshot under the write lock; the classifier runs outside.
        let (bag, freshness_confidence) = {
            let mut inner = self.inner.write().await;
            let now = Instant::now();
            if let Some(last) = inner.last_inference_at {
                if now.duration_since(last) < min_interval {
                    debug!("Inference rate gate rejected run");
                    return Ok(InferenceOutcome::RateLimited);
                }
            }
            inner.last_inference_at = Some(now);
            self.merge(&inner)
        };

        let mut record = self.engine.predict(&bag)?;
        record.overall_confidence = Some(freshness_confidence);

        let event = {
            let mut inner = self.inner.write().await;
            inner.history.push_back(record.clone());
            while inner.history.len() > self.cfg.window_size {
                inner.history.pop_front();
            }
            inner.latest = Some(record.clone());
            PredictionEvent {
                record: record.clone(),
                trends: compute_trends(&inner.history),
            }
        };

        // Fan-out signal; send never blocks on slow receivers.
        if self.events.send(event).is_err() {
            debug!("No active subscribers for prediction fan-out");
        }

        Ok(InferenceOutcome::Predicted(Box::new(record)))
    }

    // ========================================================================
    // Read-only snapshots
    // ========================================================================

    pub async fn prediction_history(&self) -> Vec<PredictionRecord> {
        self.inner.read().await.history.iter().cloned().collect()
    }

    pub async fn latest_prediction(&self) -> Option<PredictionRecord> {
        self.inner.read().await.latest.clone()
    }

    pub async fn trend_summary(&self) -> TrendSummary {
        compute_trends(&self.inner.read().await.history)
    }

    // ========================================================================
    // Subscription fan-out
    // ========================================================================

    /// Admit a subscriber: register it, hand back its delivery handle and
    /// the initial snapshot.
    pub async fn subscribe(&self) -> (u64, broadcast::Receiver<PredictionEvent>, InitialSnapshot) {
        let id = self.registry.lock().await.register();
        let receiver = self.events.subscribe();
        let inner = self.inner.read().await;
        let snapshot = InitialSnapshot {
            history: inner.history.iter().cloned().collect(),
            trends: compute_trends(&inner.history),
            latest: inner.latest.clone(),
        };
        (id, receiver, snapshot)
    }

    /// Initial snapshot delivered; subscriber now receives the stream.
    pub async fn mark_subscriber_active(&self, id: u64) {
        self.registry.lock().await.activate(id);
    }

    /// Delivery failure or peer close observed.
    pub async fn mark_subscriber_closing(&self, id: u64) {
        self.registry.lock().await.begin_close(id);
    }

    /// Cleanup complete; the handle leaves the set.
    pub async fn remove_subscriber(&self, id: u64) {
        if !self.registry.lock().await.remove(id) {
            warn!(subscriber_id = id, "Removal of unknown subscriber");
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.registry.lock().await.len()
    }
}

/// Trend summary over the rolling history: mean probability-of-high of the
/// latest five records versus the prior five-to-fifteen window.
pub(crate) fn compute_trends(history: &VecDeque<PredictionRecord>) -> TrendSummary {
    let len = history.len();
    if len < TREND_RECENT_WINDOW {
        return TrendSummary::insufficient();
    }
    let records: Vec<&PredictionRecord> = history.iter().collect();
    let recent = &records[len - TREND_RECENT_WINDOW..];
    let older = if len >= TREND_OLDER_WINDOW {
        &records[len - TREND_OLDER_WINDOW..len - TREND_RECENT_WINDOW]
    } else {
        &records[..len - TREND_RECENT_WINDOW]
    };
    if older.is_empty() {
        return TrendSummary::insufficient();
    }

    let mean = |records: &[&PredictionRecord], f: fn(&PredictionRecord) -> f64| -> f64 {
        records.iter().map(|r| f(r)).sum::<f64>() / records.len() as f64
    };
    let trend = |f: fn(&PredictionRecord) -> f64| -> DomainTrend {
        let current = mean(recent, f);
        let change = current - mean(older, f);
        let direction = if change > TREND_EPSILON {
            TrendDirection::Increasing
        } else if change < -TREND_EPSILON {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };
        DomainTrend { direction, current, change }
    };

    TrendSummary::Ok {
        environmental: trend(|r| r.environmental.probability_of_high),
        health: trend(|r| r.health.probability_of_high),
        food_security: trend(|r| r.food_security.probability_of_high),
    }
}
