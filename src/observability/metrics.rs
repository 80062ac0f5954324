//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dashboard_requests_total` (counter): settled request sequences by method, outcome
//! - `dashboard_request_retries_total` (counter): retry attempts by method
//! - `dashboard_dedupe_hits_total` (counter): callers that joined an in-flight request
//! - `dashboard_mock_requests_total` (counter): mock dispatches by method, status
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, outcome: &'static str) {
    counter!("dashboard_requests_total", "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_retry(method: &str) {
    counter!("dashboard_request_retries_total", "method" => method.to_string()).increment(1);
}

pub fn record_dedupe_hit() {
    counter!("dashboard_dedupe_hits_total").increment(1);
}

pub fn record_mock_request(method: &str, status: u16) {
    counter!(
        "dashboard_mock_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
