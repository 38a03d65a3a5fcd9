//! Health probe and scheduler metrics endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use shiftwatch_compute::{HealthStatus, SchedulerMetrics};

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `healthy` when the log source answers and a baseline is on disk, else `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub monitoring_active: bool,
    #[schema(value_type = Object)]
    pub health: HealthStatus,
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
}

/// Liveness plus a probe of the log source.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.monitor.health().await;
    Json(HealthResponse {
        status: if health.overall_healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        monitoring_active: state.monitor.is_active(),
        health,
        config: state.config.redacted_summary(),
    })
}

/// Scheduler execution counters.
#[utoipa::path(
    get,
    path = "/scheduler/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Scheduler metrics", body = Object)
    )
)]
pub async fn scheduler_metrics(State(state): State<Arc<AppState>>) -> Json<SchedulerMetrics> {
    Json(state.scheduler.metrics())
}
