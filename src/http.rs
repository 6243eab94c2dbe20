//! Metrics endpoint.
//!
//! Serves the Prometheus text exposition at `GET /metrics` on its own task,
//! next to the operator console.

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tracing::{error, info};

pub fn router() -> Router {
    Router::new().route("/metrics", get(|| async { crate::metrics::gather_metrics() }))
}

/// Bind `0.0.0.0:port` and serve until the process exits.
///
/// Failures are logged, not returned.
pub async fn run_http_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Metrics endpoint failed to bind");
            return;
        }
    };
    info!(%addr, "Metrics endpoint listening");

    if let Err(e) = axum::serve(listener, router()).await {
        error!(%addr, error = %e, "Metrics endpoint stopped");
    }
}
