//! HTTP glue around the aggregation engine.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → middleware.rs (skip excluded paths, start the clock)
//!     → request.rs (client IP, user agent, referer, header fields)
//!     → inner service
//!     → middleware.rs (status, latency, response size → Observation)
//!     → RequestLogger (queue or realtime sink)
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::telemetry_middleware;
pub use request::{default_path_aggregator, PathAggregator, RequestContext};
pub use server::{with_telemetry, HttpServer};
