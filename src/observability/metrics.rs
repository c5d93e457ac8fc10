//! Metrics collection and exposition.
//!
//! # Metrics
//! - `telemetry_observations_enqueued_total` (counter): observations accepted by the queue
//! - `telemetry_observations_dropped_total` (counter): observations dropped on a full queue
//! - `telemetry_flushes_total` (counter): non-empty window flushes
//! - `telemetry_summaries_emitted_total` (counter): summary records emitted

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

pub const OBSERVATIONS_ENQUEUED: &str = "telemetry_observations_enqueued_total";
pub const OBSERVATIONS_DROPPED: &str = "telemetry_observations_dropped_total";
pub const FLUSHES: &str = "telemetry_flushes_total";
pub const SUMMARIES_EMITTED: &str = "telemetry_summaries_emitted_total";

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_enqueued() {
    counter!(OBSERVATIONS_ENQUEUED).increment(1);
}

pub fn record_dropped() {
    counter!(OBSERVATIONS_DROPPED).increment(1);
}

pub fn record_flush(summaries: usize) {
    counter!(FLUSHES).increment(1);
    counter!(SUMMARIES_EMITTED).increment(summaries as u64);
}
