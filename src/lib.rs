//! Detection Telemetry Core
//!
//! In-memory telemetry and analytics engine for the object detection
//! portal. Ingests detection/error events from the request-processing
//! pipeline, retains a bounded recent history, and serves derived
//! metrics, time-windowed aggregates, and paginated/filterable views -
//! no backing persistent store.
//!
//! ## Architecture (6 Components)
//!
//! 1. BoundedEventLog - fixed-capacity, thread-safe event history
//! 2. CounterSet - lock-free atomic counters and derived metrics
//! 3. CategoryTaxonomy - label-to-category classification
//! 4. TimeWindowAggregator - timeframe bucketing and chart aggregates
//! 5. QueryEngine - pagination, filtering, synthetic ids, statistics
//! 6. TelemetryService - ingestion facade wired into the WebAPI
//!
//! ## Design Principles
//!
//! - Best-effort telemetry: no caller-visible failures on bad input
//! - Reads are computed from consistent snapshots, never cached
//! - Explicitly constructed state, no ambient singletons

pub mod counters;
pub mod error;
pub mod event_log;
pub mod models;
pub mod query;
pub mod state;
pub mod taxonomy;
pub mod telemetry;
pub mod time_windows;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
