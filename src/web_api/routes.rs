//! API Routes

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::DetectedObject;
use crate::query::DetectionQuery;
use crate::state::AppState;
use crate::time_windows::Timeframe;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Dashboard
        .route("/api/dashboard/metrics", get(dashboard_metrics))
        .route("/api/dashboard/chart-data", get(chart_data))
        .route("/api/dashboard/response-time-data", get(response_time_data))
        .route("/api/dashboard/detection-categories", get(detection_categories))
        .route("/api/dashboard/system-status", get(system_status))
        .route("/api/dashboard/recent-detections", get(recent_detections))
        .route("/api/dashboard/analytics", get(analytics))
        .route("/api/dashboard/error-logs", get(error_logs))
        // Ingestion (reported by the transport/inference layer)
        .route("/api/detections", post(record_detection))
        .route("/api/errors", post(record_error))
        // Detection queries
        .route("/api/detections", get(all_detections))
        .route("/api/detections/statistics", get(detection_statistics))
        .route("/api/detections/:id", get(detection_by_id))
        .route("/api/detections/:id", delete(delete_detection))
        .with_state(state)
}

// ========================================
// Query parameter types
// ========================================

#[derive(Debug, Deserialize)]
struct TimeframeQuery {
    timeframe: Option<String>,
}

impl TimeframeQuery {
    fn timeframe(&self) -> Timeframe {
        self.timeframe
            .as_deref()
            .map(Timeframe::from_param)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

// ========================================
// Ingestion handlers
// ========================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordDetectionRequest {
    #[serde(default)]
    objects: Vec<DetectedObject>,
    #[serde(default, alias = "processingTimeMs")]
    processing_time: u64,
    device: Option<String>,
    image_url: Option<String>,
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordErrorRequest {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

async fn record_detection(
    State(state): State<AppState>,
    Json(request): Json<RecordDetectionRequest>,
) -> impl IntoResponse {
    state
        .telemetry
        .record_detection(
            request.objects,
            request.processing_time,
            request.device,
            request.image_url,
            request.file_name,
        )
        .await;

    Json(json!({ "status": "recorded" }))
}

async fn record_error(
    State(state): State<AppState>,
    Json(request): Json<RecordErrorRequest>,
) -> impl IntoResponse {
    state
        .telemetry
        .record_error(request.message, request.error_type)
        .await;

    Json(json!({ "status": "recorded" }))
}

// ========================================
// Dashboard handlers
// ========================================

async fn dashboard_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.telemetry.dashboard_metrics())
}

async fn chart_data(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> impl IntoResponse {
    Json(state.telemetry.chart_data(query.timeframe()).await)
}

async fn response_time_data(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> impl IntoResponse {
    Json(state.telemetry.response_time_data(query.timeframe()).await)
}

async fn detection_categories(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.telemetry.detection_categories().await)
}

async fn system_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.telemetry.system_status().await)
}

async fn recent_detections(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(10);
    Json(state.telemetry.recent_detections(limit).await)
}

async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> impl IntoResponse {
    Json(state.telemetry.analytics(query.timeframe()).await)
}

async fn error_logs(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(50);
    Json(state.telemetry.error_logs(limit).await)
}

// ========================================
// Detection query handlers
// ========================================

async fn all_detections(
    State(state): State<AppState>,
    Query(query): Query<DetectionQuery>,
) -> impl IntoResponse {
    Json(state.telemetry.all_detections(&query).await)
}

async fn detection_statistics(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> impl IntoResponse {
    Json(state.telemetry.detection_statistics(query.timeframe()).await)
}

async fn detection_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    match state.telemetry.detection_by_id(&id).await {
        Some(record) => Ok(Json(record)),
        None => Err(Error::NotFound(format!("Detection not found: {}", id))),
    }
}

async fn delete_detection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let requested_by = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok());

    if state.telemetry.delete_detection(&id, requested_by).await {
        Ok(Json(json!({ "deleted": true, "id": id })))
    } else {
        Err(Error::NotFound(format!("Detection not found: {}", id)))
    }
}
