//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Aggregator / realtime path produce:
//!     → sink.rs (summary and per-request records via LogSink)
//!     → metrics.rs (enqueued / dropped / flushed counters)
//! Binary startup:
//!     → logging.rs (tracing subscriber: env filter, pretty or JSON)
//!     → metrics.rs (optional Prometheus exporter)
//! ```
//!
//! # Design Decisions
//! - Summary records are ordinary tracing events with their own targets,
//!   so they can be filtered and routed like any other log line
//! - Metric updates go through the `metrics` facade and cost nothing
//!   when no recorder is installed

pub mod logging;
pub mod metrics;
pub mod sink;

pub use sink::{LogSink, TracingSink, REQUEST_TARGET, SUMMARY_TARGET};
