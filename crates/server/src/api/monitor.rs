//! Drift check endpoints: Prometheus scrape, manual trigger, status.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use shiftwatch_core::ShiftReport;

use super::{api_error, ApiResult};
use crate::state::AppState;

/// Prometheus text exposition of the last completed check.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Monitor",
    responses(
        (status = 200, description = "Prometheus text format", body = String, content_type = "text/plain"),
        (status = 500, description = "Encoding failed", body = super::ErrorResponse)
    )
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let body = state.exporter.render(&state.monitor.status()).map_err(|e| {
        error!(error = %e, "failed to encode metrics");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TriggerResponse {
    /// Always `success`: the check ran; its own outcome is `result.status`.
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub result: Arc<ShiftReport>,
}

/// Run a drift check now and return its report.
#[utoipa::path(
    post,
    path = "/trigger-check",
    tag = "Monitor",
    responses(
        (status = 200, description = "Report of the check that just ran", body = TriggerResponse),
        (status = 500, description = "Check task aborted", body = super::ErrorResponse)
    )
)]
pub async fn trigger_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<TriggerResponse>> {
    let report = state
        .scheduler
        .trigger_now()
        .await
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "check aborted before producing a report"))?;

    Ok(Json(TriggerResponse {
        status: "success",
        timestamp: Utc::now(),
        result: report,
    }))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub monitoring_active: bool,
    #[schema(value_type = Option<Object>)]
    pub last_check_result: Option<Arc<ShiftReport>>,
    pub last_check_timestamp: Option<DateTime<Utc>>,
    pub total_checks: u64,
}

/// Monitor state and the last report.
#[utoipa::path(
    get,
    path = "/status",
    tag = "Monitor",
    responses(
        (status = 200, description = "Monitor status", body = StatusResponse)
    )
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let s = state.monitor.status();
    Json(StatusResponse {
        monitoring_active: s.active,
        last_check_result: s.last_result,
        last_check_timestamp: s.last_timestamp,
        total_checks: s.total_checks,
    })
}
