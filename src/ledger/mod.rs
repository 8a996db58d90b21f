//! # Ledger Collaborators
//!
//! The reporter never talks to ledger storage directly. It resolves a node
//! handle through a [`LedgerNodeRegistry`] and asks that handle for event
//! counts, consensus timing and the latest block summary. Storage engines
//! plug in by implementing these traits.

pub mod memory;

pub use memory::{EventKind, InMemoryLedgerNode, InMemoryLedgerRegistry, LedgerEvent};

use crate::error::ReporterResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Identity under which a node takes part in consensus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusIdentity {
    pub id: String,
}

impl ConsensusIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Consensus condition of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusFilter {
    #[default]
    Any,
    /// Consensus recorded on the event
    Reached,
    /// No consensus field present on the event
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTypeFilter {
    #[default]
    Any,
    Merge,
}

/// Predicate for [`LedgerNode::count_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub consensus: ConsensusFilter,
    pub event_type: EventTypeFilter,
}

impl EventFilter {
    /// Every event
    pub const fn all() -> Self {
        Self {
            consensus: ConsensusFilter::Any,
            event_type: EventTypeFilter::Any,
        }
    }

    /// Events that have not reached consensus
    pub const fn outstanding() -> Self {
        Self {
            consensus: ConsensusFilter::Pending,
            event_type: EventTypeFilter::Any,
        }
    }

    /// Every merge event
    pub const fn merge() -> Self {
        Self {
            consensus: ConsensusFilter::Any,
            event_type: EventTypeFilter::Merge,
        }
    }

    /// Merge events that have not reached consensus
    pub const fn merge_outstanding() -> Self {
        Self {
            consensus: ConsensusFilter::Pending,
            event_type: EventTypeFilter::Merge,
        }
    }
}

/// Average consensus time over the most recent merge events of one creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusTimeQuery {
    /// Consensus identity whose merge events are sampled
    pub creator: String,
    /// Number of most recent (highest generation) events to average
    pub sample_size: usize,
}

/// Handle to a single ledger node's storage and consensus state
#[async_trait]
pub trait LedgerNode: Send + Sync + Debug {
    /// Canonical node identifier
    fn id(&self) -> &str;

    async fn consensus_identity(&self) -> ReporterResult<ConsensusIdentity>;

    async fn count_events(&self, filter: EventFilter) -> ReporterResult<u64>;

    /// Mean of `consensus date - creation date` in milliseconds over the
    /// sampled events that reached consensus; `None` when there are none
    async fn average_consensus_time(&self, query: ConsensusTimeQuery)
        -> ReporterResult<Option<f64>>;

    /// Summary of the most recent block, passed through to the collector
    async fn latest_block_summary(&self) -> ReporterResult<serde_json::Value>;
}

/// Resolves node handles by identifier
#[async_trait]
pub trait LedgerNodeRegistry: Send + Sync + Debug {
    async fn get(&self, ledger_node_id: &str) -> ReporterResult<Arc<dyn LedgerNode>>;
}
