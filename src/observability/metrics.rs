//! Prometheus metrics for the HTTP surface
//!
//! Labels are kept low-cardinality: the matched route template instead of the
//! raw path (so `/bookmarks/{id}` never fans out per identifier) and status
//! codes bucketed into classes.

use anyhow::{Result, anyhow};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Calling it again returns the
/// existing handle.
pub fn init_metrics() -> Result<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow!("Failed to install Prometheus recorder: {}", e))?;

    Ok(PROMETHEUS.get_or_init(|| handle).clone())
}

/// Handle of the installed recorder, if any
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS.get()
}

/// Bucket HTTP status codes to control cardinality
pub fn bucket_status_code(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

pub fn record_http_request(method: &str, route: &str, status_code: u16, duration: Duration) {
    let status_bucket = bucket_status_code(status_code);

    counter!(
        "http_request_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status_bucket
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status_bucket
    )
    .record(duration.as_secs_f64());
}
