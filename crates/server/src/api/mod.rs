//! Domain-focused API endpoint modules.
//!
//! Shared error types live here in mod.rs.

mod baseline;
pub(crate) mod doc;
mod health;
mod monitor;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use shiftwatch_core::ShiftError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn api_error(code: StatusCode, error: impl Into<String>) -> ApiError {
    (
        code,
        Json(ErrorResponse {
            status: "error",
            error: error.into(),
        }),
    )
}

/// Map a domain error onto an HTTP status.
pub(crate) fn shift_error(e: ShiftError) -> ApiError {
    let code = match &e {
        ShiftError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ShiftError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ShiftError::ScoringFailure(_) => StatusCode::BAD_GATEWAY,
        ShiftError::Persistence(_) | ShiftError::Io(_) | ShiftError::Serialize(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(code, e.to_string())
}

// ── Re-exports ───────────────────────────────────────────────────

pub use baseline::{baseline_get, baseline_update};
pub use health::{health, scheduler_metrics};
pub use monitor::{metrics, status, trigger_check};
