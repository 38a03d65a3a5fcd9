//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "shiftwatch API",
        version = "0.1.0",
        description = "Data shift monitoring for inference traffic against an operator-managed baseline.",
    ),
    tags(
        (name = "Health", description = "Service health and scheduler metrics"),
        (name = "Monitor", description = "Drift checks, status, and Prometheus export"),
        (name = "Baseline", description = "Reference snapshot read and update"),
    ),
    paths(
        crate::api::health::health,
        crate::api::health::scheduler_metrics,
        crate::api::monitor::metrics,
        crate::api::monitor::trigger_check,
        crate::api::monitor::status,
        crate::api::baseline::baseline_get,
        crate::api::baseline::baseline_update,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::monitor::TriggerResponse,
        crate::api::monitor::StatusResponse,
        crate::api::baseline::BaselineResponse,
        crate::api::baseline::BaselineUpdateRequest,
    ))
)]
pub struct ApiDoc;
