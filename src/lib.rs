//! Request telemetry aggregation.
//!
//! Measures every HTTP request and, instead of logging one line per
//! request, folds the measurements into per-series summaries emitted once
//! per window.

pub mod aggregate;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod observability;

pub use config::TelemetryConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use logger::RequestLogger;
