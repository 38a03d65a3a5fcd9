//! Baseline read and update endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use shiftwatch_core::{Baseline, BaselineUpdate};

use super::{api_error, shift_error, ApiResult};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct BaselineResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[schema(value_type = Object)]
    pub baseline: Arc<Baseline>,
}

/// Operator-supplied replacement baseline. `updated_at` is set by the server.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct BaselineUpdateRequest {
    pub avg_text_length: f64,
    pub text_length_std: f64,
    /// language code -> percentage share
    pub language_distribution: BTreeMap<String, f64>,
    pub avg_request_volume: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<BaselineUpdateRequest> for BaselineUpdate {
    fn from(r: BaselineUpdateRequest) -> Self {
        BaselineUpdate {
            avg_text_length: r.avg_text_length,
            text_length_std: r.text_length_std,
            language_distribution: r.language_distribution,
            avg_request_volume: r.avg_request_volume,
            description: r.description,
        }
    }
}

/// The active baseline.
#[utoipa::path(
    get,
    path = "/baseline",
    tag = "Baseline",
    responses(
        (status = 200, description = "Active baseline", body = BaselineResponse)
    )
)]
pub async fn baseline_get(State(state): State<Arc<AppState>>) -> Json<BaselineResponse> {
    Json(BaselineResponse {
        status: "success",
        message: None,
        baseline: state.monitor.baseline(),
    })
}

/// Replace the active baseline. Takes effect for the next check.
#[utoipa::path(
    post,
    path = "/baseline/update",
    tag = "Baseline",
    request_body = BaselineUpdateRequest,
    responses(
        (status = 200, description = "Baseline replaced", body = BaselineResponse),
        (status = 422, description = "Rejected values", body = super::ErrorResponse),
        (status = 500, description = "Baseline could not be persisted", body = super::ErrorResponse)
    )
)]
pub async fn baseline_update(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BaselineUpdateRequest>,
) -> ApiResult<Json<BaselineResponse>> {
    // The store writes and fsyncs the file; keep that off the runtime threads.
    let monitor = Arc::clone(&state.monitor);
    let baseline = tokio::task::spawn_blocking(move || monitor.update_baseline(req.into()))
        .await
        .map_err(|e| {
            error!(error = %e, "baseline update task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "baseline update task failed")
        })?
        .map_err(|e| {
            warn!(error = %e, "baseline update rejected");
            shift_error(e)
        })?;

    Ok(Json(BaselineResponse {
        status: "success",
        message: Some("Baseline updated successfully".to_string()),
        baseline,
    }))
}
