//! Prometheus metrics setup and metric definitions

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    // Prometheus defaults plus sub-millisecond buckets for fast endpoints
    let buckets = vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .context("failed to set histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Register metric descriptions so HELP/TYPE lines appear from startup.
pub fn describe_metrics() {
    // HTTP metrics
    describe_counter!("catcheat_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "catcheat_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "catcheat_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    // Business metrics
    describe_counter!(
        "catcheat_store_operations_total",
        "Store operations by kind (create/get/list/update/delete/nearby)"
    );
    describe_counter!(
        "catcheat_auth_login_total",
        "Login attempts by provider and result"
    );
}
