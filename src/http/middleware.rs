//! Telemetry middleware.
//! Produces one observation per completed request.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::http::request::RequestContext;
use crate::logger::RequestLogger;

pub async fn telemetry_middleware(
    State(logger): State<Arc<RequestLogger>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if logger.is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    let created = Utc::now();
    let start = Instant::now();
    let context = RequestContext::capture(&request, logger.request_config());

    let response = next.run(request).await;

    let observation = context.into_observation(
        created,
        start.elapsed(),
        response.status().as_u16(),
        response_size(&response),
        logger.path_aggregator(),
    );
    logger.record(observation);

    response
}

/// Exact body size when known up front, else `Content-Length`, else 0.
fn response_size(response: &Response) -> u64 {
    response
        .body()
        .size_hint()
        .exact()
        .or_else(|| {
            response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(0)
}
