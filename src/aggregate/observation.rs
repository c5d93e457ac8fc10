//! Per-request observation records.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// One completed request, as measured by the middleware.
///
/// The six grouping fields (`ip`, `status_code`, `user_agent`, `method`,
/// `proto`, `aggregate_path`) decide which summary series the record lands
/// in. `remote_ip` and [`RequestDetails`] ride along but never affect
/// grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// Time the request started.
    pub created: DateTime<Utc>,

    /// Resolved client IP (from configured headers, else the peer address).
    pub ip: String,

    /// Transport-level peer address.
    pub remote_ip: String,

    pub user_agent: String,
    pub method: String,

    /// Protocol version, e.g. `HTTP/1.1`.
    pub proto: String,

    pub status_code: u16,

    /// Route label produced by the path aggregator.
    pub aggregate_path: String,

    pub latency: Duration,

    /// Response body size in bytes.
    pub response_size: u64,

    /// Fields only rendered by the realtime (non-aggregating) path.
    pub details: RequestDetails,
}

/// Request attributes kept for per-request logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDetails {
    pub path: String,
    pub query: String,
    pub referer: String,

    /// Filtered request headers, populated only when header logging is on.
    pub headers: BTreeMap<String, String>,

    /// Configured header fields that were present on the request.
    pub extra_fields: BTreeMap<String, String>,
}
