pub mod aggregate;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::CrconClient;

/// Shared handler state. The proxy is stateless across requests; this is
/// only the upstream client handle.
#[derive(Clone)]
pub struct AppState {
    pub crcon: Arc<CrconClient>,
}

/// Build the proxy router: the aggregation route, a liveness probe, and the
/// permissive CORS the static frontend needs for cross-origin polling.
pub fn router(crcon: Arc<CrconClient>) -> Router {
    // The client data service sends cache-defeating request headers, so the
    // preflight must admit them alongside the standard set.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ]);

    Router::new()
        .route(
            "/api/live-stats",
            get(aggregate::live_stats).post(aggregate::live_stats),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { crcon })
}

/// Bind and serve until ctrl-c
pub async fn run(addr: &str, crcon: Arc<CrconClient>) -> Result<()> {
    let app = router(crcon);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Aggregation proxy listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Proxy server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

async fn health_check() -> &'static str {
    "OK"
}
