//! Scrape loop: fetch node list, publish metrics, sleep, repeat.
//!
//! Runs on startup and then every 60 seconds after the previous cycle
//! finishes. Cycles never overlap and a failed fetch never ends the loop:
//! it is published as `ic_node_api_up 0` and retried on the next tick.

use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::{debug, error, info};

use crate::api::NodeSource;
use crate::metrics::ExporterMetrics;

/// Pause between the end of one cycle and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Loop-local state carried between cycles.
#[derive(Debug, Default)]
pub struct PollerState {
    /// Set while the upstream keeps failing, so the error is logged once.
    api_failing: bool,
}

/// Run the scrape loop forever.
pub async fn run_poller(
    source: Arc<dyn NodeSource>,
    metrics: Arc<ExporterMetrics>,
    provider_id: String,
) {
    info!(provider_id = %provider_id, "📡 Scraping...");
    let mut state = PollerState::default();

    loop {
        run_cycle(source.as_ref(), &metrics, &provider_id, &mut state).await;
        time::sleep(POLL_INTERVAL).await;
    }
}

/// Execute one fetch-map-publish cycle. Returns whether the fetch succeeded.
pub async fn run_cycle(
    source: &dyn NodeSource,
    metrics: &ExporterMetrics,
    provider_id: &str,
    state: &mut PollerState,
) -> bool {
    match source.fetch_nodes().await {
        Ok(resp) => {
            if state.api_failing {
                state.api_failing = false;
                info!("IC API is online. Continuing scraping...");
            }
            for node in resp.nodes.iter().filter(|n| !n.status.is_known()) {
                debug!(
                    node_id = %node.node_id,
                    status = node.status.as_str(),
                    "Unrecognized node status, publishing 0"
                );
            }
            metrics.record_success(provider_id, &resp.nodes);
            debug!(
                nodes = resp.nodes.len(),
                series = metrics.status_series_count(),
                "Metrics updated"
            );
            true
        }
        Err(e) => {
            if state.api_failing {
                debug!("IC API still unavailable: {}", e);
            } else {
                state.api_failing = true;
                error!("{}", e);
            }
            metrics.record_failure(provider_id);
            false
        }
    }
}
