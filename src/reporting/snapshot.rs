//! # Status Snapshot
//!
//! The document a node publishes to the collector each cycle, and the
//! assembler that builds it from a completed reporting result map.

use super::value::{ReportResultsExt, ReportValue};
use crate::constants::{paths, tasks};
use crate::error::ReporterResult;
use crate::metrics::{DurationMetrics, LocalPeerRates};
use crate::orchestration::TaskResults;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Static publication metadata for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishContext {
    pub base_uri: String,
    pub label: String,
    pub ledger_node_id: String,
    pub public_hostname: String,
    pub private_hostname: String,
    pub server_port: u16,
}

impl PublishContext {
    pub fn log_url(&self) -> String {
        self.public_url(paths::LOG_APP)
    }

    pub fn mongo_url(&self) -> String {
        self.public_url(paths::MONGO)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "https://{}:{}/{}",
            self.public_hostname, self.server_port, path
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    pub avg_consensus_time: f64,
    pub events_per_second_local: i64,
    pub events_per_second_peer: i64,
    pub merge_events_outstanding: u64,
    pub merge_events_total: u64,
    pub outstanding: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub latest_summary: serde_json::Value,
    pub duration: DurationMetrics,
    pub events: EventMetrics,
    pub load_average: [f64; 3],
    pub ops_per_second: LocalPeerRates,
    /// Consensus identity the node reports under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
}

/// Body of `POST {collector}/nodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub base_uri: String,
    pub label: String,
    pub ledger_node_id: String,
    pub log_url: String,
    pub mongo_url: String,
    pub private_hostname: String,
    pub public_hostname: String,
    pub status: NodeStatus,
}

/// Samples the host's 1, 5 and 15 minute load averages
pub type LoadSampler = Arc<dyn Fn() -> [f64; 3] + Send + Sync>;

pub fn system_load_average() -> [f64; 3] {
    let load = sysinfo::System::load_average();
    [load.one, load.five, load.fifteen]
}

/// Maps a completed reporting result map onto a [`StatusSnapshot`]
#[derive(Clone)]
pub struct SnapshotAssembler {
    load_sampler: LoadSampler,
}

impl SnapshotAssembler {
    pub fn new() -> Self {
        Self::with_load_sampler(Arc::new(system_load_average))
    }

    pub fn with_load_sampler(load_sampler: LoadSampler) -> Self {
        Self { load_sampler }
    }

    /// Build the snapshot; load average is sampled here, not earlier
    pub fn assemble(
        &self,
        results: &TaskResults<ReportValue>,
        context: &PublishContext,
    ) -> ReporterResult<StatusSnapshot> {
        let events = EventMetrics {
            avg_consensus_time: results.average(tasks::AVG_CONSENSUS_TIME)?,
            events_per_second_local: results.rate(tasks::EVENTS_PER_SECOND_LOCAL)?,
            events_per_second_peer: results.rate(tasks::EVENTS_PER_SECOND_PEER)?,
            merge_events_outstanding: results.count(tasks::MERGE_EVENTS_OUTSTANDING)?,
            merge_events_total: results.count(tasks::MERGE_EVENTS_TOTAL)?,
            outstanding: results.count(tasks::EVENTS_OUTSTANDING)?,
            total: results.count(tasks::EVENTS_TOTAL)?,
        };

        let target_node = if results.contains(tasks::CREATOR) {
            Some(results.identity(tasks::CREATOR)?.id)
        } else {
            None
        };

        let status = NodeStatus {
            latest_summary: results.summary(tasks::LATEST_SUMMARY)?,
            duration: results.durations(tasks::DURATION)?,
            events,
            load_average: (self.load_sampler)(),
            ops_per_second: results.rates(tasks::OPS_PER_SECOND)?,
            target_node,
        };

        debug!(
            ledger_node_id = %context.ledger_node_id,
            events_total = status.events.total,
            events_outstanding = status.events.outstanding,
            "Assembled status snapshot"
        );

        Ok(StatusSnapshot {
            base_uri: context.base_uri.clone(),
            label: context.label.clone(),
            ledger_node_id: context.ledger_node_id.clone(),
            log_url: context.log_url(),
            mongo_url: context.mongo_url(),
            private_hostname: context.private_hostname.clone(),
            public_hostname: context.public_hostname.clone(),
            status,
        })
    }
}

impl Default for SnapshotAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SnapshotAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotAssembler").finish_non_exhaustive()
    }
}
