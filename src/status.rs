//! Node status enumeration and its numeric encoding for `ic_node_status`.

use serde::Deserialize;

/// Status of an IC node as reported by the public API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NodeStatus {
    Up,
    Unassigned,
    Degraded,
    Down,
    Unrecognized,
    /// Anything the API may add later.
    Other(String),
}

impl NodeStatus {
    /// Gauge value published for this status. Unknown statuses encode as 0.
    pub fn code(&self) -> i64 {
        match self {
            NodeStatus::Up => 1,
            NodeStatus::Unassigned => 2,
            NodeStatus::Degraded => 3,
            NodeStatus::Down => 4,
            NodeStatus::Unrecognized => 5,
            NodeStatus::Other(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeStatus::Up => "UP",
            NodeStatus::Unassigned => "UNASSIGNED",
            NodeStatus::Degraded => "DEGRADED",
            NodeStatus::Down => "DOWN",
            NodeStatus::Unrecognized => "UNRECOGNIZED",
            NodeStatus::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NodeStatus::Other(_))
    }
}

impl Default for NodeStatus {
    /// Stands in for a null or missing status; encodes as 0.
    fn default() -> Self {
        NodeStatus::Other(String::new())
    }
}

impl From<&str> for NodeStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "UP" => NodeStatus::Up,
            "UNASSIGNED" => NodeStatus::Unassigned,
            "DEGRADED" => NodeStatus::Degraded,
            "DOWN" => NodeStatus::Down,
            "UNRECOGNIZED" => NodeStatus::Unrecognized,
            other => NodeStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeStatus {
    fn from(raw: String) -> Self {
        NodeStatus::from(raw.as_str())
    }
}
