//! Application state
//!
//! Holds the shared telemetry core and server configuration.

use crate::event_log::DEFAULT_CAPACITY;
use crate::telemetry::TelemetryService;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server port
    pub port: u16,
    /// Server host
    pub host: String,
    /// Retained history per event log
    pub history_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            history_capacity: std::env::var("HISTORY_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Telemetry and analytics core
    pub telemetry: Arc<TelemetryService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let telemetry = Arc::new(TelemetryService::new(config.history_capacity));
        Self { config, telemetry }
    }
}
