//! In-process ledger backend for local runs and tests.

use super::{
    ConsensusFilter, ConsensusIdentity, ConsensusTimeQuery, EventFilter, EventTypeFilter,
    LedgerNode, LedgerNodeRegistry,
};
use crate::error::{ReporterError, ReporterResult};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Regular,
    Merge,
}

/// Stored event metadata relevant to status reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    pub kind: EventKind,
    pub creator: String,
    pub generation: u64,
    /// Creation time, epoch milliseconds
    pub created_ms: i64,
    /// Consensus time, epoch milliseconds; absent until consensus
    pub consensus_ms: Option<i64>,
}

impl LedgerEvent {
    pub fn regular(creator: impl Into<String>, generation: u64, created_ms: i64) -> Self {
        Self {
            kind: EventKind::Regular,
            creator: creator.into(),
            generation,
            created_ms,
            consensus_ms: None,
        }
    }

    pub fn merge(creator: impl Into<String>, generation: u64, created_ms: i64) -> Self {
        Self {
            kind: EventKind::Merge,
            ..Self::regular(creator, generation, created_ms)
        }
    }

    pub fn with_consensus(mut self, consensus_ms: i64) -> Self {
        self.consensus_ms = Some(consensus_ms);
        self
    }

    fn matches(&self, filter: &EventFilter) -> bool {
        let consensus = match filter.consensus {
            ConsensusFilter::Any => true,
            ConsensusFilter::Reached => self.consensus_ms.is_some(),
            ConsensusFilter::Pending => self.consensus_ms.is_none(),
        };
        let kind = match filter.event_type {
            EventTypeFilter::Any => true,
            EventTypeFilter::Merge => self.kind == EventKind::Merge,
        };
        consensus && kind
    }
}

#[derive(Debug)]
pub struct InMemoryLedgerNode {
    id: String,
    identity: ConsensusIdentity,
    events: RwLock<Vec<LedgerEvent>>,
    latest_summary: RwLock<serde_json::Value>,
}

impl InMemoryLedgerNode {
    pub fn new(id: impl Into<String>, identity: ConsensusIdentity) -> Self {
        Self {
            id: id.into(),
            identity,
            events: RwLock::new(Vec::new()),
            latest_summary: RwLock::new(serde_json::Value::Null),
        }
    }

    pub fn record_event(&self, event: LedgerEvent) {
        self.events.write().push(event);
    }

    pub fn set_latest_summary(&self, summary: serde_json::Value) {
        *self.latest_summary.write() = summary;
    }
}

#[async_trait]
impl LedgerNode for InMemoryLedgerNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn consensus_identity(&self) -> ReporterResult<ConsensusIdentity> {
        Ok(self.identity.clone())
    }

    async fn count_events(&self, filter: EventFilter) -> ReporterResult<u64> {
        let count = self
            .events
            .read()
            .iter()
            .filter(|event| event.matches(&filter))
            .count();
        Ok(count as u64)
    }

    async fn average_consensus_time(
        &self,
        query: ConsensusTimeQuery,
    ) -> ReporterResult<Option<f64>> {
        let events = self.events.read();
        let mut sampled: Vec<&LedgerEvent> = events
            .iter()
            .filter(|event| {
                event.kind == EventKind::Merge
                    && event.consensus_ms.is_some()
                    && event.creator == query.creator
            })
            .collect();
        sampled.sort_by(|a, b| b.generation.cmp(&a.generation));
        sampled.truncate(query.sample_size);

        if sampled.is_empty() {
            return Ok(None);
        }

        let total: i64 = sampled
            .iter()
            .filter_map(|event| event.consensus_ms.map(|at| at - event.created_ms))
            .sum();
        Ok(Some(total as f64 / sampled.len() as f64))
    }

    async fn latest_block_summary(&self) -> ReporterResult<serde_json::Value> {
        Ok(self.latest_summary.read().clone())
    }
}

/// Registry of [`InMemoryLedgerNode`]s keyed by node identifier
#[derive(Debug, Default)]
pub struct InMemoryLedgerRegistry {
    nodes: DashMap<String, Arc<InMemoryLedgerNode>>,
}

impl InMemoryLedgerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, node: Arc<InMemoryLedgerNode>) {
        self.nodes.insert(node.id.clone(), node);
    }
}

#[async_trait]
impl LedgerNodeRegistry for InMemoryLedgerRegistry {
    async fn get(&self, ledger_node_id: &str) -> ReporterResult<Arc<dyn LedgerNode>> {
        match self.nodes.get(ledger_node_id) {
            Some(node) => {
                let node: Arc<dyn LedgerNode> = node.value().clone();
                Ok(node)
            }
            None => Err(ReporterError::storage(
                "ledger_node.get",
                format!("ledger node not found: {ledger_node_id}"),
            )),
        }
    }
}
