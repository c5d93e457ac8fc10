//! Request attribute extraction.
//!
//! # Responsibilities
//! - Resolve the client IP from configured headers, else the peer address
//! - Resolve user agent and referer, preferring proxy-supplied headers
//! - Collect configured header fields and, optionally, the filtered headers
//! - Label the request path for grouping (route template or error bucket)
//!
//! # Design Decisions
//! - Everything is captured before the inner service runs, since the request
//!   is consumed by it
//! - Invalid IP strings in client IP headers are skipped, not trusted

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, MatchedPath};
use axum::http::{header, HeaderMap, Request};
use chrono::{DateTime, Utc};

use crate::aggregate::observation::{Observation, RequestDetails};
use crate::config::RequestConfig;

/// Maps (route template, raw path, status code) to the grouping path label.
pub type PathAggregator = Arc<dyn Fn(&str, &str, u16) -> String + Send + Sync>;

/// Route template if the request matched one; otherwise an error bucket.
pub fn default_path_aggregator(route: &str, _path: &str, status_code: u16) -> String {
    if !route.is_empty() {
        return route.to_string();
    }
    match status_code {
        400..=499 => "error_4xx".to_string(),
        500.. => "error_5xx".to_string(),
        _ => "missing_route".to_string(),
    }
}

/// First non-empty value among `names`.
pub fn header_value<S: AsRef<str>>(headers: &HeaderMap, names: &[S]) -> Option<String> {
    names.iter().find_map(|name| {
        headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// First valid IP found in `names`; comma-separated lists are scanned left to right.
pub fn client_ip_from_headers<S: AsRef<str>>(headers: &HeaderMap, names: &[S]) -> Option<String> {
    names.iter().find_map(|name| {
        let value = headers.get(name.as_ref())?.to_str().ok()?;
        value
            .split(',')
            .map(str::trim)
            .find(|candidate| candidate.parse::<IpAddr>().is_ok())
            .map(str::to_string)
    })
}

/// User agent from the configured headers, or the standard header when none are configured.
pub fn user_agent<S: AsRef<str>>(headers: &HeaderMap, configured: &[S]) -> String {
    if configured.is_empty() {
        return header_value(headers, &[header::USER_AGENT.as_str()]).unwrap_or_default();
    }
    header_value(headers, configured).unwrap_or_default()
}

pub fn referer(headers: &HeaderMap) -> String {
    header_value(headers, &["x-referer", header::REFERER.as_str()]).unwrap_or_default()
}

fn is_hidden_header(name: &str) -> bool {
    matches!(name, "cdn-loop" | "user-agent" | "x-real-ip")
        || name.starts_with("cf-")
        || name.starts_with("x-forwarded-")
}

/// Request headers worth logging, with repeated values joined by ` | `.
pub fn loggable_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .filter(|name| !is_hidden_header(name.as_str()))
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(" | ");
            (name.as_str().to_string(), joined)
        })
        .collect()
}

/// Everything the middleware needs from the request before it is consumed.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub route: String,
    pub path: String,
    pub query: String,
    pub method: String,
    pub proto: String,
    pub ip: String,
    pub remote_ip: String,
    pub user_agent: String,
    pub referer: String,
    pub headers: BTreeMap<String, String>,
    pub extra_fields: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn capture<B>(request: &Request<B>, config: &RequestConfig) -> Self {
        let headers = request.headers();

        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        let remote_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_default();
        let ip = client_ip_from_headers(headers, &config.client_ip_headers)
            .unwrap_or_else(|| remote_ip.clone());

        let extra_fields = config
            .header_fields
            .iter()
            .filter_map(|(field, names)| {
                header_value(headers, names).map(|value| (field.clone(), value))
            })
            .collect();

        Self {
            route,
            path: request.uri().path().to_string(),
            query: request.uri().query().unwrap_or_default().to_string(),
            method: request.method().to_string(),
            proto: format!("{:?}", request.version()),
            ip,
            remote_ip,
            user_agent: user_agent(headers, &config.user_agent_headers),
            referer: referer(headers),
            headers: if config.log_headers {
                loggable_headers(headers)
            } else {
                BTreeMap::new()
            },
            extra_fields,
        }
    }

    /// Complete the record once the response is known.
    pub fn into_observation(
        self,
        created: DateTime<Utc>,
        latency: Duration,
        status_code: u16,
        response_size: u64,
        path_aggregator: &PathAggregator,
    ) -> Observation {
        let aggregate_path = path_aggregator(&self.route, &self.path, status_code);
        Observation {
            created,
            ip: self.ip,
            remote_ip: self.remote_ip,
            user_agent: self.user_agent,
            method: self.method,
            proto: self.proto,
            status_code,
            aggregate_path,
            latency,
            response_size,
            details: RequestDetails {
                path: self.path,
                query: self.query,
                referer: self.referer,
                headers: self.headers,
                extra_fields: self.extra_fields,
            },
        }
    }
}
