use serde::{Deserialize, Serialize};

/// Scalar duration counters (milliseconds) recorded by the node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationMetrics {
    pub aggregate: i64,
    pub find_consensus: i64,
    pub recent_history_merge_only: i64,
}

/// Averages of a local/peer pair of counter series over the same window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPeerRates {
    pub local: i64,
    pub peer: i64,
}
