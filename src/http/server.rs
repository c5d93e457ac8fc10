//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap any axum Router with the telemetry middleware
//! - Serve the demo routes with a request timeout
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Path, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::http::middleware::telemetry_middleware;
use crate::logger::RequestLogger;

/// Attach the telemetry middleware to every route of `router`.
pub fn with_telemetry(router: Router, logger: Arc<RequestLogger>) -> Router {
    router.layer(middleware::from_fn_with_state(logger, telemetry_middleware))
}

/// Demo HTTP server producing telemetry for its own routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, logger: Arc<RequestLogger>) -> Self {
        Self {
            router: Self::build_router(config, logger),
        }
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, logger: Arc<RequestLogger>) -> Router {
        let routes = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route("/health", get(|| async { "ok" }))
            .route("/users/{id}", get(user_handler))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));
        with_telemetry(routes, logger)
    }

    /// Serve until `shutdown` fires, then drain open connections.
    pub async fn run(self, listener: TcpListener, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn user_handler(Path(id): Path<u64>) -> String {
    format!("user {}", id)
}
