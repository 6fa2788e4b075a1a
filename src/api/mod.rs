//! IC API: node record types and the source trait the poller pulls from.
//!
//! The poller only ever sees `NodeSource`; the real implementation lives in
//! `client.rs` and talks to the public IC API over HTTPS.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::status::NodeStatus;

pub mod client;

/// Label names for `ic_node_status`, in the order `NodeRecord::label_values` yields.
pub const NODE_LABEL_NAMES: [&str; 10] = [
    "node_id",
    "node_operator_id",
    "node_provider_id",
    "node_provider_name",
    "owner",
    "region",
    "subnet_id",
    "ip_address",
    "dc_id",
    "dc_name",
];

// ── Core Types ──────────────────────────────────────────────────────

/// Body of `GET /api/v3/nodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeListResponse {
    pub nodes: Vec<NodeRecord>,
}

/// One node as reported by the IC API. Rebuilt every poll cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub node_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub node_operator_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub node_provider_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub node_provider_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub owner: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub region: String,
    // Unassigned nodes come back with a null subnet.
    #[serde(default, deserialize_with = "nullable_string")]
    pub subnet_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub ip_address: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub dc_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub dc_name: String,
    #[serde(default, deserialize_with = "nullable_status")]
    pub status: NodeStatus,
}

impl NodeRecord {
    /// Identity tuple matching `NODE_LABEL_NAMES`.
    pub fn label_values(&self) -> [&str; 10] {
        [
            self.node_id.as_str(),
            self.node_operator_id.as_str(),
            self.node_provider_id.as_str(),
            self.node_provider_name.as_str(),
            self.owner.as_str(),
            self.region.as_str(),
            self.subnet_id.as_str(),
            self.ip_address.as_str(),
            self.dc_id.as_str(),
            self.dc_name.as_str(),
        ]
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_status<'de, D>(deserializer: D) -> Result<NodeStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(NodeStatus::from)
        .unwrap_or_default())
}

// ── Errors ──────────────────────────────────────────────────────────

/// A failed fetch. Every variant is transient: the poller reports the API
/// as down and tries again next cycle.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("IC API request error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("IC API response error! Status code: {status}, body: {body}")]
    Status { status: u16, body: String },

    #[error("IC API returned malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

// ── Source Trait ────────────────────────────────────────────────────

/// Anything that can produce the current node list for one provider.
#[async_trait]
pub trait NodeSource: Send + Sync {
    async fn fetch_nodes(&self) -> Result<NodeListResponse, ApiError>;
}
