//! TelemetryService - detection/error ingestion and dashboard reads
//!
//! ## Responsibilities
//!
//! - Record completed detections and pipeline errors (fire-and-forget)
//! - Maintain the bounded detection/error histories and the counters
//! - Serve dashboard metrics, chart series, analytics, listings, and
//!   per-record lookup/deletion
//!
//! Read-side results are computed on demand from a consistent snapshot
//! of the logs and counters; nothing is precomputed between writes.
//! A detection report touches the log, the counters, and the occurrence
//! maps without a cross-structure transaction - no invariant spans more
//! than one structure, so readers may briefly observe one updated ahead
//! of the others.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};
use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::counters::{round1, CounterSet};
use crate::event_log::{BoundedEventLog, DEFAULT_CAPACITY};
use crate::models::{DetectedObject, DetectionEvent, DetectionRecord, ErrorEvent};
use crate::query::{
    self, detection_id, DetectionPage, DetectionQuery, DetectionStatistics,
};
use crate::taxonomy::{classify, Category};
use crate::time_windows::{self, Timeframe, TIMESTAMP_FORMAT};

/// Baseline chart value when no call has ever been recorded.
const DEFAULT_BASELINE_MS: f64 = 500.0;

/// Placeholder analytics values shown before any real data arrives.
const DEFAULT_AVG_CONFIDENCE: f64 = 92.7;
const DEFAULT_AVG_OBJECTS_PER_FRAME: f64 = 2.4;

/// Cold-start category distribution (People, Vehicles, Animals,
/// Objects) shown until real counts exist.
const DEFAULT_CATEGORY_COUNTS: [u64; 4] = [42, 23, 15, 20];

/// Illustrative cold-start device distribution.
const DEFAULT_DEVICES: [(&str, u64); 6] = [
    ("iPhone", 32),
    ("Samsung", 27),
    ("Google Pixel", 14),
    ("Xiaomi", 12),
    ("OnePlus", 8),
    ("Other", 7),
];

const TOP_DEVICE_LIMIT: usize = 6;

/// Top-line dashboard gauges.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub active_sessions: u64,
    pub api_calls: u64,
    /// Average response time in whole milliseconds.
    pub response_time: u64,
    pub error_rate: f64,
    pub last_updated: String,
}

/// Labeled integer series (call volume, category counts).
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

/// Labeled float series (response times).
#[derive(Debug, Clone, Serialize)]
pub struct ResponseTimeSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

/// Aggregate performance block of the analytics view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Mean confidence across all stored objects, as a percentage.
    pub avg_confidence: f64,
    pub success_rate: f64,
    pub avg_objects_per_frame: f64,
    /// Cosmetic gauge; not part of the testable contract.
    pub unique_users: u64,
}

/// Analytics view: performance aggregates plus device distribution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub performance: PerformanceMetrics,
    pub device_distribution: ChartSeries,
}

/// Cosmetic per-service status row for the dashboard.
///
/// Load and uptime are synthetic placeholders, not real health data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
    pub status_class: String,
    pub load: u64,
    pub uptime: String,
    pub last_update: String,
}

/// Telemetry and analytics core.
///
/// Owns the two bounded event logs, the counter set, and the
/// process-lifetime category/device occurrence maps. Constructed
/// explicitly (no ambient singletons) so tests can run isolated
/// instances.
pub struct TelemetryService {
    detections: BoundedEventLog<DetectionEvent>,
    errors: BoundedEventLog<ErrorEvent>,
    counters: CounterSet,
    /// Cumulative per-category object counts; unlike the log these are
    /// never evicted.
    category_counts: RwLock<HashMap<Category, u64>>,
    /// Cumulative per-device detection counts.
    device_counts: RwLock<HashMap<String, u64>>,
}

impl TelemetryService {
    /// Create a service retaining at most `capacity` entries per log.
    pub fn new(capacity: usize) -> Self {
        Self {
            detections: BoundedEventLog::new(capacity),
            errors: BoundedEventLog::new(capacity),
            counters: CounterSet::new(),
            category_counts: RwLock::new(HashMap::new()),
            device_counts: RwLock::new(HashMap::new()),
        }
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }

    // ========================================
    // Ingestion (fire-and-forget, never fails)
    // ========================================

    /// Record a completed detection.
    ///
    /// A missing device label degrades to "Unknown" in the stored
    /// event; only explicitly reported devices enter the device
    /// distribution.
    pub async fn record_detection(
        &self,
        objects: Vec<DetectedObject>,
        processing_time_ms: u64,
        device: Option<String>,
        image_url: Option<String>,
        file_name: Option<String>,
    ) {
        self.counters.record_session();
        self.counters.record_api_call(processing_time_ms);

        let event = DetectionEvent {
            timestamp: self.now_timestamp(),
            object_count: objects.len(),
            objects,
            processing_time_ms,
            device: device.clone().unwrap_or_else(|| "Unknown".to_string()),
            image_url,
            file_name,
        };

        {
            let mut categories = self.category_counts.write().await;
            for object in &event.objects {
                *categories.entry(classify(&object.label)).or_insert(0) += 1;
            }
        }

        if let Some(device) = device {
            let mut devices = self.device_counts.write().await;
            *devices.entry(device).or_insert(0) += 1;
        }

        tracing::info!(
            objects = event.object_count,
            device = %event.device,
            processing_time_ms,
            image_url = event.image_url.as_deref().unwrap_or("-"),
            "Recorded detection"
        );

        self.detections.append(event).await;
    }

    /// Record a pipeline error.
    pub async fn record_error(&self, message: impl Into<String>, error_type: impl Into<String>) {
        self.counters.record_error();

        let error = ErrorEvent {
            timestamp: self.now_timestamp(),
            message: message.into(),
            error_type: error_type.into(),
            level: "ERROR".to_string(),
        };

        tracing::warn!(
            error_type = %error.error_type,
            message = %error.message,
            "Recorded error"
        );

        self.errors.append(error).await;
    }

    // ========================================
    // Dashboard reads
    // ========================================

    pub fn dashboard_metrics(&self) -> DashboardMetrics {
        DashboardMetrics {
            active_sessions: self.counters.active_sessions(),
            api_calls: self.counters.total_api_calls(),
            response_time: self.counters.average_response_time_ms(),
            error_rate: self.counters.error_rate(),
            last_updated: self.now_timestamp(),
        }
    }

    /// Call-volume series for the given timeframe.
    pub async fn chart_data(&self, timeframe: Timeframe) -> ChartSeries {
        let snapshot = self.detections.snapshot().await;
        let buckets = time_windows::buckets(timeframe, self.now());

        let mut labels = Vec::with_capacity(buckets.len());
        let mut data = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            labels.push(bucket.label.clone());
            data.push(time_windows::count_in(&snapshot, bucket));
        }

        ChartSeries { labels, data }
    }

    /// Average-response-time series for the given timeframe. Empty
    /// buckets fall back to the overall average (or 500ms before the
    /// first call) so charts never show a misleading zero.
    pub async fn response_time_data(&self, timeframe: Timeframe) -> ResponseTimeSeries {
        let snapshot = self.detections.snapshot().await;
        let buckets = time_windows::buckets(timeframe, self.now());
        let baseline = self.baseline_response_time();

        let mut labels = Vec::with_capacity(buckets.len());
        let mut data = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            labels.push(bucket.label.clone());
            data.push(time_windows::average_processing_in(
                &snapshot, bucket, baseline,
            ));
        }

        ResponseTimeSeries { labels, data }
    }

    fn baseline_response_time(&self) -> f64 {
        let calls = self.counters.total_api_calls();
        if calls == 0 {
            return DEFAULT_BASELINE_MS;
        }
        self.counters.total_processing_time_ms() as f64 / calls as f64
    }

    /// Per-category detection counts in fixed display order, with the
    /// illustrative cold-start distribution when everything is zero.
    pub async fn detection_categories(&self) -> ChartSeries {
        let counts = self.category_counts.read().await;

        let labels: Vec<String> = Category::ALL
            .iter()
            .map(|category| category.display_name().to_string())
            .collect();
        let mut data: Vec<u64> = Category::ALL
            .iter()
            .map(|category| counts.get(category).copied().unwrap_or(0))
            .collect();

        if data.iter().all(|&count| count == 0) {
            data = DEFAULT_CATEGORY_COUNTS.to_vec();
        }

        ChartSeries { labels, data }
    }

    /// Analytics view. The timeframe is accepted for interface
    /// compatibility; performance metrics span the whole retained
    /// history.
    pub async fn analytics(&self, _timeframe: Timeframe) -> Analytics {
        let snapshot = self.detections.snapshot().await;

        Analytics {
            performance: PerformanceMetrics {
                avg_confidence: average_confidence(&snapshot),
                success_rate: self.counters.success_rate(),
                avg_objects_per_frame: average_objects_per_frame(&snapshot),
                unique_users: self.unique_users().await,
            },
            device_distribution: self.device_distribution().await,
        }
    }

    async fn device_distribution(&self) -> ChartSeries {
        let devices = self.device_counts.read().await;

        if devices.is_empty() {
            return ChartSeries {
                labels: DEFAULT_DEVICES.iter().map(|(name, _)| name.to_string()).collect(),
                data: DEFAULT_DEVICES.iter().map(|(_, count)| *count).collect(),
            };
        }

        let mut sorted: Vec<(&String, &u64)> = devices.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        sorted.truncate(TOP_DEVICE_LIMIT);

        ChartSeries {
            labels: sorted.iter().map(|(name, _)| (*name).clone()).collect(),
            data: sorted.iter().map(|(_, count)| **count).collect(),
        }
    }

    async fn unique_users(&self) -> u64 {
        // Cosmetic gauge: distinct devices, floored by a synthetic
        // visitor count for demo dashboards.
        let distinct = self.device_counts.read().await.len() as u64;
        let synthetic = rand::thread_rng().gen_range(300..400);
        distinct.max(synthetic)
    }

    /// Cosmetic service rows for the system-status panel.
    pub async fn system_status(&self) -> Vec<ServiceStatus> {
        let stored = self.detections.len().await as u64;
        let mut rng = rand::thread_rng();

        let row = |service: &str, load: u64, uptime: &str, last_update: &str| ServiceStatus {
            service: service.to_string(),
            status: "Online".to_string(),
            status_class: "success".to_string(),
            load,
            uptime: uptime.to_string(),
            last_update: last_update.to_string(),
        };

        vec![
            row(
                "API Server",
                (25 + self.counters.active_sessions() * 2).min(95),
                "7d 12h 24m",
                "Just now",
            ),
            row(
                "Database",
                (18 + self.counters.total_api_calls() % 30).min(90),
                "14d 3h 12m",
                "1m ago",
            ),
            row(
                "ML Engine (DETR)",
                (60 + rng.gen_range(0..20)).min(95),
                "3d 18h 45m",
                "3m ago",
            ),
            row(
                "Cloudinary Storage",
                (30 + stored / 2).min(95),
                "21d 9h 32m",
                "5m ago",
            ),
        ]
    }

    // ========================================
    // Listings and per-record operations
    // ========================================

    /// Newest-first detection history, at most `limit` entries.
    pub async fn recent_detections(&self, limit: i64) -> Vec<DetectionEvent> {
        self.detections.recent(limit).await
    }

    /// Newest-first error history, at most `limit` entries.
    pub async fn error_logs(&self, limit: i64) -> Vec<ErrorEvent> {
        self.errors.recent(limit).await
    }

    /// Filtered, sorted, paginated detection listing with ids attached.
    pub async fn all_detections(&self, query: &DetectionQuery) -> DetectionPage {
        let snapshot = self.detections.snapshot().await;
        query::query_page(snapshot, query)
    }

    /// Look up a detection by its synthetic id.
    pub async fn detection_by_id(&self, id: &str) -> Option<DetectionRecord> {
        let snapshot = self.detections.snapshot().await;
        query::find_by_id(&snapshot, id)
    }

    /// Delete the first detection whose synthetic id matches.
    ///
    /// Returns whether a removal occurred. Successful deletions leave
    /// an audit line with the requesting device.
    pub async fn delete_detection(&self, id: &str, requested_by: Option<&str>) -> bool {
        let deleted = self
            .detections
            .remove_first(|event| detection_id(event) == id)
            .await;

        if deleted {
            tracing::info!(
                detection_id = %id,
                device = requested_by.unwrap_or("unknown"),
                "Deleted detection"
            );
        } else {
            tracing::warn!(detection_id = %id, "Detection not found for deletion");
        }

        deleted
    }

    /// Windowed statistics over the detection history.
    pub async fn detection_statistics(&self, timeframe: Timeframe) -> DetectionStatistics {
        let snapshot = self.detections.snapshot().await;
        query::statistics(&snapshot, timeframe, self.now())
    }

    pub async fn detections_stored(&self) -> usize {
        self.detections.len().await
    }

    pub async fn errors_stored(&self) -> usize {
        self.errors.len().await
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn average_confidence(snapshot: &[DetectionEvent]) -> f64 {
    let mut total = 0.0f64;
    let mut count = 0usize;
    for event in snapshot {
        for object in &event.objects {
            total += object.confidence * 100.0;
            count += 1;
        }
    }
    if count == 0 {
        return DEFAULT_AVG_CONFIDENCE;
    }
    round1(total / count as f64)
}

fn average_objects_per_frame(snapshot: &[DetectionEvent]) -> f64 {
    if snapshot.is_empty() {
        return DEFAULT_AVG_OBJECTS_PER_FRAME;
    }
    let total: usize = snapshot.iter().map(|event| event.object_count).sum();
    round1(total as f64 / snapshot.len() as f64)
}
