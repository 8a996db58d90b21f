//! Builders for reporting-cycle fixtures

#![allow(dead_code)]

use ledger_status::cache::InMemoryCounterStore;
use ledger_status::client::StatusPublisher;
use ledger_status::config::CollectorConfig;
use ledger_status::ledger::{
    ConsensusIdentity, InMemoryLedgerNode, InMemoryLedgerRegistry, LedgerEvent, LedgerNodeRegistry,
};
use ledger_status::metrics::WindowedCounterReader;
use ledger_status::reporting::{PublishContext, ReportingEnvironment, SnapshotAssembler};
use std::sync::Arc;

pub const NODE_ID: &str = "did:ledger:node:4ea6c2c6-6d8e-4bd7-9a8f-31d5f0c1e2a3";
pub const NODE_TOKEN: &str = "4ea6c2c66d8e4bd79a8f31d5f0c1e2a3";
pub const VOTER_ID: &str = "https://node-1.example.com/consensus/voters/z6Mk";
pub const NOW: i64 = 1_700_000_000;
pub const FIXED_LOAD: [f64; 3] = [1.5, 1.25, 0.75];

pub fn publish_context() -> PublishContext {
    PublishContext {
        base_uri: "https://node-1.example.com:18443".to_string(),
        label: "node-1".to_string(),
        ledger_node_id: NODE_ID.to_string(),
        public_hostname: "node-1.example.com".to_string(),
        private_hostname: "ip-10-0-0-12.internal".to_string(),
        server_port: 18443,
    }
}

/// Set `value` for the `count` most recent seconds of a counter series
pub fn fill_window(store: &InMemoryCounterStore, prefix: &str, count: i64, value: &str) {
    for offset in 1..=count {
        store.set(format!("{prefix}|{NODE_TOKEN}|{}", NOW - offset), value);
    }
}

/// Counters for a node that has been busy for the whole window
pub fn busy_counter_store() -> Arc<InMemoryCounterStore> {
    let store = Arc::new(InMemoryCounterStore::new());
    store.set(format!("t|aggregate|{NODE_TOKEN}"), "1200");
    store.set(format!("t|findConsensus|{NODE_TOKEN}"), "340");
    store.set(format!("t|recentHistoryMergeOnly|{NODE_TOKEN}"), "56");
    fill_window(&store, "ocl", 600, "12");
    fill_window(&store, "ocp", 300, "8");
    fill_window(&store, "ecl", 600, "3");
    fill_window(&store, "ecp", 150, "2");
    store
}

/// A node with a mix of settled and outstanding events
pub fn sample_ledger_node() -> Arc<InMemoryLedgerNode> {
    let node = Arc::new(InMemoryLedgerNode::new(
        NODE_ID,
        ConsensusIdentity::new(VOTER_ID),
    ));
    node.record_event(LedgerEvent::regular(VOTER_ID, 1, 0).with_consensus(50));
    node.record_event(LedgerEvent::regular(VOTER_ID, 2, 100));
    node.record_event(LedgerEvent::merge(VOTER_ID, 3, 1_000).with_consensus(1_500));
    node.record_event(LedgerEvent::merge(VOTER_ID, 4, 2_000).with_consensus(2_300));
    node.record_event(LedgerEvent::merge(VOTER_ID, 5, 3_000));
    node.set_latest_summary(serde_json::json!({
        "eventBlock": {"block": {"blockHeight": 42}, "meta": {"blockHash": "zQm"}}
    }));
    node
}

pub fn sample_registry() -> Arc<InMemoryLedgerRegistry> {
    let registry = Arc::new(InMemoryLedgerRegistry::new());
    registry.register(sample_ledger_node());
    registry
}

pub fn environment(
    store: Arc<InMemoryCounterStore>,
    registry: Arc<dyn LedgerNodeRegistry>,
) -> ReportingEnvironment {
    ReportingEnvironment {
        reader: WindowedCounterReader::new(store),
        registry,
        assembler: SnapshotAssembler::with_load_sampler(Arc::new(|| FIXED_LOAD)),
        publisher: StatusPublisher::new(&CollectorConfig {
            request_timeout_ms: 2_000,
            ..CollectorConfig::default()
        })
        .expect("Failed to build test publisher"),
    }
}
