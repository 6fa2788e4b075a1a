//! Prometheus registry for the three exporter series.
//!
//! Every series is re-derived each poll cycle: `ic_node_status` is reset
//! and repopulated so nodes that disappear upstream never linger.
//! The registry is private to the exporter, so no process/platform
//! collectors end up on the endpoint.

use prometheus::core::Collector;
use prometheus::{Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::api::{NodeRecord, NODE_LABEL_NAMES};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("metrics output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub struct ExporterMetrics {
    registry: Registry,
    api_up: IntGauge,
    node_count: IntGaugeVec,
    node_status: IntGaugeVec,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let api_up = IntGauge::new("ic_node_api_up", "Status of the IC API")?;
        let node_count = IntGaugeVec::new(
            Opts::new(
                "ic_node_count",
                "Number of nodes found for the given node provider ID",
            ),
            &["node_provider_id"],
        )?;
        let node_status = IntGaugeVec::new(
            Opts::new("ic_node_status", "Numerical encoded status of the IC node"),
            &NODE_LABEL_NAMES,
        )?;

        registry.register(Box::new(api_up.clone()))?;
        registry.register(Box::new(node_count.clone()))?;
        registry.register(Box::new(node_status.clone()))?;

        Ok(Self { registry, api_up, node_count, node_status })
    }

    /// Publish a successful fetch. Replaces every `ic_node_status` series.
    pub fn record_success(&self, provider_id: &str, nodes: &[NodeRecord]) {
        self.api_up.set(1);
        self.node_count
            .with_label_values(&[provider_id])
            .set(nodes.len() as i64);

        self.node_status.reset();
        for node in nodes {
            self.node_status
                .with_label_values(&node.label_values())
                .set(node.status.code());
        }
    }

    /// Publish a failed fetch: API down, zero nodes, no status series.
    pub fn record_failure(&self, provider_id: &str) {
        self.api_up.set(0);
        self.node_count.with_label_values(&[provider_id]).set(0);
        self.node_status.reset();
    }

    /// Number of live label combinations under `ic_node_status`.
    pub fn status_series_count(&self) -> usize {
        self.node_status
            .collect()
            .iter()
            .map(|mf| mf.get_metric().len())
            .sum()
    }

    /// Content type of `gather` output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Encode the registry in the Prometheus text exposition format.
    pub fn gather(&self) -> Result<String, MetricsError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
