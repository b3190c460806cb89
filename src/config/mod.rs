//! Service Configuration Module
//!
//! Provides service-wide configuration loaded from a TOML file, replacing
//! hardcoded tunables with operator-adjustable values.
//!
//! ## Loading Order
//!
//! 1. `CIVITAS_CONFIG` environment variable (path to TOML file)
//! 2. `civitas.toml` in the current working directory
//! 3. Built-in defaults (matching `config::defaults`)
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` for wiring:
//!
//! ```ignore
//! // In main():
//! config::init(ServiceConfig::load());
//!
//! // At construction sites:
//! let manager = RealtimeStateManager::new(engine, config::get().realtime);
//! ```

pub mod defaults;
mod service_config;

pub use service_config::*;

use std::sync::OnceLock;

/// Global service configuration, initialized once at startup.
static SERVICE_CONFIG: OnceLock<ServiceConfig> = OnceLock::new();

/// Initialize the global service configuration.
///
/// Repeated calls are ignored with a warning so tests can share a process.
pub fn init(config: ServiceConfig) {
    if SERVICE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global service configuration.
///
/// Panics if `init()` has not been called; a missing config is a fatal
/// startup error, not a recoverable condition.
#[allow(clippy::expect_used)]
pub fn get() -> &'static ServiceConfig {
    SERVICE_CONFIG
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}

/// Check whether the config has been initialized.
///
/// Useful for tests and optional config paths.
pub fn is_initialized() -> bool {
    SERVICE_CONFIG.get().is_some()
}
