//! Shared models and types
//!
//! Wire types shared across the telemetry core and the web API,
//! kept here to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box from the classification backend.
///
/// Coordinates are whatever unit the backend emitted (pixels or
/// normalized); the core only stores and echoes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// A single detected object within one processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    pub label: String,
    /// Confidence in [0, 1] as reported by the backend.
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

/// One completed detection, immutable once recorded.
///
/// `object_count` is fixed at insertion time and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    /// ISO-8601 local timestamp with millisecond precision, assigned
    /// at record time. Fixed-width, so lexicographic order is
    /// chronological order.
    pub timestamp: String,
    pub objects: Vec<DetectedObject>,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
    pub device: String,
    pub object_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// A detection event paired with its synthetic id.
///
/// Ids are derived on read (see `query::detection_id`), never stored.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionRecord {
    pub id: String,
    #[serde(flatten)]
    pub event: DetectionEvent,
}

/// One recorded pipeline error, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub timestamp: String,
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    /// Always "ERROR"; kept for dashboard display compatibility.
    pub level: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub detections_stored: usize,
    pub errors_stored: usize,
}
