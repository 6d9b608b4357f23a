//! Metrics collection and exposition.
//!
//! # Metrics
//! - `scaffold_dispatch_total` (counter): dispatches by variant, outcome
//! - `scaffold_access_denied_total` (counter): auth gate short-circuits
//! - `scaffold_xsrf_failures_total` (counter): XSRF gate short-circuits
//! - `scaffold_security_violations_total` (counter): fatal violations by kind

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(error) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        tracing::error!(%error, "failed to install metrics exporter");
    } else {
        tracing::info!(address = %addr, "metrics exporter listening");
    }
}

/// Count one completed dispatch.
pub fn record_dispatch(variant: &'static str, outcome: &'static str) {
    counter!("scaffold_dispatch_total", "variant" => variant, "outcome" => outcome).increment(1);
}

/// Count one auth-gate denial.
pub fn record_access_denied(variant: &'static str) {
    counter!("scaffold_access_denied_total", "variant" => variant).increment(1);
}

/// Count one XSRF-gate failure.
pub fn record_xsrf_failure(variant: &'static str) {
    counter!("scaffold_xsrf_failures_total", "variant" => variant).increment(1);
}

/// Count one fatal security violation.
pub fn record_security_violation(kind: &'static str) {
    counter!("scaffold_security_violations_total", "kind" => kind).increment(1);
}
