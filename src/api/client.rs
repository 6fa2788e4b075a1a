//! HTTP client for the public IC API.

use async_trait::async_trait;
use http::header::USER_AGENT;
use tracing::debug;

use super::{ApiError, NodeListResponse, NodeSource};

const CLIENT_IDENTIFIER: &str =
    "IC Node Status Prometheus Exporter (github.com/virtualhive/ic-node-status-prometheus-exporter)";

/// Longest error body kept in `ApiError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct IcApiClient {
    client: reqwest::Client,
    base_url: String,
    provider_id: String,
}

impl IcApiClient {
    pub fn new(base_url: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            provider_id: provider_id.into(),
        }
    }

    fn nodes_url(&self) -> String {
        format!("{}/api/v3/nodes", self.base_url)
    }
}

#[async_trait]
impl NodeSource for IcApiClient {
    async fn fetch_nodes(&self) -> Result<NodeListResponse, ApiError> {
        let resp = self
            .client
            .get(self.nodes_url())
            .query(&[("node_provider_id", self.provider_id.as_str())])
            .header(USER_AGENT, CLIENT_IDENTIFIER)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: NodeListResponse = serde_json::from_str(&body).map_err(ApiError::Decode)?;
        debug!(
            provider_id = %self.provider_id,
            nodes = parsed.nodes.len(),
            "Fetched node list"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    const ONE_NODE: &str = r#"{"nodes":[{"node_id":"n1","node_operator_id":"op1","node_provider_id":"p1","node_provider_name":"P One","owner":"o1","region":"r1","subnet_id":"s1","ip_address":"10.0.0.1","dc_id":"dc1","dc_name":"DC One","status":"UP"}]}"#;

    /// Start a throwaway upstream on a random local port.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_success_sends_provider_and_user_agent() {
        let app = Router::new().route(
            "/api/v3/nodes",
            get(|Query(q): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                let agent = headers
                    .get(USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if q.get("node_provider_id").map(String::as_str) != Some("p1")
                    || agent != CLIENT_IDENTIFIER
                {
                    return (StatusCode::BAD_REQUEST, String::from("bad request"));
                }
                (StatusCode::OK, ONE_NODE.to_string())
            }),
        );
        let base = serve(app).await;

        let client = IcApiClient::new(base, "p1");
        let resp = client.fetch_nodes().await.unwrap();
        assert_eq!(resp.nodes.len(), 1);
        assert_eq!(resp.nodes[0].node_id, "n1");
        assert_eq!(resp.nodes[0].status.code(), 1);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let app = Router::new().route(
            "/api/v3/nodes",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve(app).await;

        let err = IcApiClient::new(base, "p1").fetch_nodes().await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_body_truncated() {
        let app = Router::new().route(
            "/api/v3/nodes",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(2_000)) }),
        );
        let base = serve(app).await;

        let err = IcApiClient::new(base, "p1").fetch_nodes().await.unwrap_err();
        match err {
            ApiError::Status { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_CHARS),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let app = Router::new().route("/api/v3/nodes", get(|| async { "<html>oops</html>" }));
        let base = serve(app).await;

        let err = IcApiClient::new(base, "p1").fetch_nodes().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = IcApiClient::new(format!("http://{}", addr), "p1")
            .fetch_nodes()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
    }
}
