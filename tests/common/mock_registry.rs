//! Ledger collaborators that misbehave on purpose

#![allow(dead_code)]

use async_trait::async_trait;
use ledger_status::error::{ReporterError, ReporterResult};
use ledger_status::ledger::{
    ConsensusIdentity, ConsensusTimeQuery, EventFilter, LedgerNode, LedgerNodeRegistry,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Registry whose lookups always fail with a storage error
#[derive(Debug, Default)]
pub struct FailingRegistry {
    pub lookups: AtomicUsize,
}

#[async_trait]
impl LedgerNodeRegistry for FailingRegistry {
    async fn get(&self, ledger_node_id: &str) -> ReporterResult<Arc<dyn LedgerNode>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(ReporterError::storage(
            "ledger_node.get",
            format!("storage offline for {ledger_node_id}"),
        ))
    }
}

/// Node whose event counts never return
#[derive(Debug)]
pub struct StalledLedgerNode {
    pub id: String,
}

#[async_trait]
impl LedgerNode for StalledLedgerNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn consensus_identity(&self) -> ReporterResult<ConsensusIdentity> {
        Ok(ConsensusIdentity::new("stalled-voter"))
    }

    async fn count_events(&self, _filter: EventFilter) -> ReporterResult<u64> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(0)
    }

    async fn average_consensus_time(
        &self,
        _query: ConsensusTimeQuery,
    ) -> ReporterResult<Option<f64>> {
        Ok(None)
    }

    async fn latest_block_summary(&self) -> ReporterResult<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}

#[derive(Debug)]
pub struct StalledRegistry;

#[async_trait]
impl LedgerNodeRegistry for StalledRegistry {
    async fn get(&self, ledger_node_id: &str) -> ReporterResult<Arc<dyn LedgerNode>> {
        Ok(Arc::new(StalledLedgerNode {
            id: ledger_node_id.to_string(),
        }))
    }
}
