use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::metrics::prometheus_handle;

/// Render the Prometheus exposition text
pub async fn metrics_endpoint() -> Response {
    match prometheus_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        )
            .into_response(),
        None => {
            tracing::error!("Metrics requested before the recorder was installed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Metrics not available").into_response()
        }
    }
}
