//! Metrics HTTP endpoint.
//!
//! Serves the registry in the Prometheus text format on `/` and `/metrics`.
//! Read-only, unauthenticated, bound on all interfaces.

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::metrics::ExporterMetrics;

pub fn router(metrics: Arc<ExporterMetrics>) -> Router {
    Router::new()
        .route("/", get(render_metrics))
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

/// Bind the listener. Kept separate from `serve` so bind failures surface
/// at startup, before the poller runs.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "📈 Metrics endpoint listening");
    Ok(listener)
}

pub async fn serve(listener: TcpListener, metrics: Arc<ExporterMetrics>) -> Result<()> {
    axum::serve(listener, router(metrics)).await?;
    Ok(())
}

async fn render_metrics(State(metrics): State<Arc<ExporterMetrics>>) -> Response {
    match metrics.gather() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::node;

    async fn spawn_server(metrics: Arc<ExporterMetrics>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, metrics));
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_scrape_root_and_metrics_path() {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        metrics.record_success("p1", &[node("n1", "UP")]);
        let base = spawn_server(Arc::clone(&metrics)).await;

        for path in ["/", "/metrics"] {
            let resp = reqwest::get(format!("{}{}", base, path)).await.unwrap();
            assert_eq!(resp.status(), reqwest::StatusCode::OK);
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert!(content_type.starts_with("text/plain"), "got {}", content_type);

            let body = resp.text().await.unwrap();
            assert!(body.contains("ic_node_api_up 1"));
            assert!(body.contains("ic_node_count{node_provider_id=\"p1\"} 1"));
        }
    }

    #[tokio::test]
    async fn test_scrape_reflects_latest_cycle() {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        metrics.record_success("p1", &[node("n1", "UP")]);
        let base = spawn_server(Arc::clone(&metrics)).await;

        metrics.record_failure("p1");
        let body = reqwest::get(&base).await.unwrap().text().await.unwrap();
        assert!(body.contains("ic_node_api_up 0"));
        assert!(!body.contains("ic_node_status{"));
    }
}
