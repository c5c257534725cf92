//! Metrics collection and exposition.
//!
//! # Metrics
//! - `objectschema_requests_total` (counter): requests by method, operation, status
//! - `objectschema_request_duration_seconds` (histogram): latency by operation
//! - `objectschema_store_operations_total` (counter): storage calls by operation, outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, operation: &'static str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "objectschema_requests_total",
        "method" => method.to_string(),
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("objectschema_request_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}

/// Record a storage collaborator call.
pub fn record_store_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "objectschema_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
