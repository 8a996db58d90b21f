//! # Status Publisher
//!
//! HTTP client for the two calls a node makes to the rest of the network:
//! fetching the genesis block from the primary and posting its status
//! snapshot to the collector. Neither call retries; retry cadence belongs to
//! whoever schedules reporting cycles.

use crate::config::CollectorConfig;
use crate::constants::paths;
use crate::error::{ReporterError, ReporterResult};
use crate::reporting::StatusSnapshot;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Genesis block as served by the primary, kept as raw JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenesisBlock(pub serde_json::Value);

impl GenesisBlock {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// HTTP client for the primary and the status collector
#[derive(Debug, Clone)]
pub struct StatusPublisher {
    client: Client,
}

impl StatusPublisher {
    pub fn new(config: &CollectorConfig) -> ReporterResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(format!("ledger-status/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                ReporterError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        debug!(
            timeout_ms = config.request_timeout_ms,
            accept_invalid_certs = config.accept_invalid_certs,
            "Created status publisher"
        );

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the genesis block from a primary node
    ///
    /// GET {primary}/genesis
    #[instrument(skip(self))]
    pub async fn fetch_genesis(&self, primary_base_url: &str) -> ReporterResult<GenesisBlock> {
        let url = endpoint(primary_base_url, paths::GENESIS)?;
        debug!(url = %url, "Retrieving genesis block");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Error retrieving genesis block");
                return Err(ReporterError::genesis_unavailable(None, e.to_string()));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Error retrieving genesis block");
            return Err(ReporterError::genesis_unavailable(
                Some(status.as_u16()),
                format!("HTTP {status}"),
            ));
        }

        let genesis = response.json::<GenesisBlock>().await.map_err(|e| {
            warn!(error = %e, "Genesis block response was not valid JSON");
            ReporterError::genesis_unavailable(Some(status.as_u16()), e.to_string())
        })?;

        info!("Retrieved genesis block");
        Ok(genesis)
    }

    /// Post a status snapshot to the collector
    ///
    /// POST {collector}/nodes
    #[instrument(skip(self, snapshot), fields(ledger_node_id = %snapshot.ledger_node_id))]
    pub async fn publish(
        &self,
        snapshot: &StatusSnapshot,
        collector_url: &str,
    ) -> ReporterResult<()> {
        let url = endpoint(collector_url, paths::NODES)?;
        debug!(url = %url, "Sending status");

        let response = self
            .client
            .post(url)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Network error sending status");
                ReporterError::publish_failed(None, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Collector rejected status");
            return Err(ReporterError::publish_failed(
                Some(status.as_u16()),
                format!("HTTP {status}: {body}"),
            ));
        }

        info!(status = %status, "Status published");
        Ok(())
    }
}

/// `{base}/{path}` with any trailing slash on `base` collapsed
fn endpoint(base: &str, path: &str) -> ReporterResult<Url> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), path);
    Url::parse(&joined)
        .map_err(|e| ReporterError::configuration(format!("Invalid URL '{joined}': {e}")))
}
