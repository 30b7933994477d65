//! Metrics recording and the `/metrics` endpoint

pub mod endpoint;
pub mod metrics;

pub use endpoint::metrics_endpoint;
pub use self::metrics::{bucket_status_code, init_metrics, record_http_request};
