use axum::{
    extract::State,
    http::StatusCode,
    response::{Json, Response},
};
use tracing::debug;

use super::{HealthManager, HealthResponse, HealthStatus};

/// Liveness probe: 200 whenever the process can answer at all
pub async fn liveness_handler() -> Response<String> {
    debug!("Liveness check requested");

    let mut response = Response::new("OK".to_string());
    *response.status_mut() = StatusCode::OK;
    response
}

/// Readiness probe: JSON health report, 503 once the service (or its store)
/// is unhealthy or still starting after the grace period.
pub async fn readiness_handler(
    State(health_manager): State<HealthManager>,
) -> Result<Json<HealthResponse>, StatusCode> {
    debug!("Readiness check requested");

    let health_response = health_manager.get_health().await;

    match health_response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => Ok(Json(health_response)),
        HealthStatus::Starting if health_manager.is_in_startup_period() => {
            Ok(Json(health_response))
        }
        HealthStatus::Starting | HealthStatus::Unhealthy => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
