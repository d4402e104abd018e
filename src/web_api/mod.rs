//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Request parameter translation
//! - Response formatting
//!
//! Handlers are thin: all clamping, defaulting, and aggregation
//! semantics live in the telemetry core.

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        detections_stored: state.telemetry.detections_stored().await,
        errors_stored: state.telemetry.errors_stored().await,
    };

    Json(response)
}
