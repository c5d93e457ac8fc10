//! Telemetry middleware driven through an axum Router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use request_telemetry::config::TelemetryConfig;
use request_telemetry::http::with_telemetry;
use request_telemetry::RequestLogger;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

mod common;

use common::CapturingSink;

fn app(logger: Arc<RequestLogger>) -> Router {
    let routes = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/health", get(|| async { "ok" }))
        .route("/users/{id}", get(|| async { "user" }))
        .route("/boom", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
    with_telemetry(routes, logger)
}

fn request(uri: &str) -> Request<Body> {
    let mut req = Request::builder()
        .uri(uri)
        .header("user-agent", "Mozilla/5.0")
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.2")
        .header("x-cf-ipcountry", "IT")
        .body(Body::empty())
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo("192.168.1.10:40000".parse::<SocketAddr>().unwrap()));
    req
}

fn config() -> TelemetryConfig {
    let mut config = TelemetryConfig::default();
    config.request.excluded_paths = vec!["/health".into()];
    config.request.client_ip_headers = vec!["x-forwarded-for".into()];
    config
        .request
        .header_fields
        .insert("country".into(), vec!["x-cf-ipcountry".into(), "cf-ipcountry".into()]);
    config
}

#[tokio::test]
async fn test_realtime_observation_per_request() {
    let sink = Arc::new(CapturingSink::default());
    let (logger, _) = RequestLogger::builder(config())
        .sink(sink.clone())
        .start(CancellationToken::new());
    let app = app(logger);

    let res = app.clone().oneshot(request("/users/42?tab=posts")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let requests = sink.requests();
    assert_eq!(requests.len(), 1);

    let (o, _) = &requests[0];
    assert_eq!(o.ip, "203.0.113.5");
    assert_eq!(o.remote_ip, "192.168.1.10");
    assert_eq!(o.user_agent, "Mozilla/5.0");
    assert_eq!(o.method, "GET");
    assert_eq!(o.proto, "HTTP/1.1");
    assert_eq!(o.status_code, 200);
    assert_eq!(o.aggregate_path, "/users/{id}");
    assert_eq!(o.response_size, 4);
    assert_eq!(o.details.path, "/users/42");
    assert_eq!(o.details.query, "tab=posts");
    assert_eq!(o.details.extra_fields["country"], "IT");
}

#[tokio::test]
async fn test_unmatched_and_failing_routes_are_bucketed() {
    let sink = Arc::new(CapturingSink::default());
    let (logger, _) = RequestLogger::builder(config())
        .sink(sink.clone())
        .start(CancellationToken::new());
    let app = app(logger);

    let res = app.clone().oneshot(request("/nope")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = app.clone().oneshot(request("/boom")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let paths: Vec<String> = sink
        .requests()
        .into_iter()
        .map(|(o, _)| o.aggregate_path)
        .collect();
    assert_eq!(paths, vec!["error_4xx".to_string(), "/boom".to_string()]);
}

#[tokio::test]
async fn test_excluded_paths_are_not_observed() {
    let sink = Arc::new(CapturingSink::default());
    let (logger, _) = RequestLogger::builder(config())
        .sink(sink.clone())
        .start(CancellationToken::new());
    let app = app(logger);

    let res = app.clone().oneshot(request("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(sink.requests().is_empty());
}

#[tokio::test]
async fn test_custom_path_aggregator() {
    let sink = Arc::new(CapturingSink::default());
    let (logger, _) = RequestLogger::builder(config())
        .sink(sink.clone())
        .path_aggregator(|_route, path, _status| path.trim_start_matches('/').replace('/', "."))
        .start(CancellationToken::new());
    let app = app(logger);

    app.oneshot(request("/users/7")).await.unwrap();
    assert_eq!(sink.requests()[0].0.aggregate_path, "users.7");
}

#[tokio::test(start_paused = true)]
async fn test_aggregated_requests_summarised_per_route() {
    let sink = Arc::new(CapturingSink::default());
    let mut config = config();
    config.aggregation.enabled = true;
    config.aggregation.interval_ms = 5_000;

    let cancel = CancellationToken::new();
    let (logger, handle) = RequestLogger::builder(config)
        .sink(sink.clone())
        .start(cancel.clone());
    let app = app(logger);

    for uri in ["/users/1", "/users/2", "/users/3", "/ping", "/health"] {
        app.clone().oneshot(request(uri)).await.unwrap();
    }
    assert!(sink.requests().is_empty());

    tokio::time::sleep(Duration::from_millis(5_100)).await;

    let mut summaries = sink.summaries();
    summaries.sort_by(|a, b| a.aggregate_path.cmp(&b.aggregate_path));
    assert_eq!(summaries.len(), 2);
    assert_eq!((summaries[0].aggregate_path.as_str(), summaries[0].count), ("/ping", 1));
    assert_eq!((summaries[1].aggregate_path.as_str(), summaries[1].count), ("/users/{id}", 3));
    assert_eq!(summaries[1].sum_response_size, 12);
    assert_eq!(summaries[1].ip, "203.0.113.5");

    cancel.cancel();
    handle.unwrap().stopped().await;
}
