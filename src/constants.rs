//! # System Constants
//!
//! Cache key prefixes, window sizing and reporting task names that define the
//! operational boundaries of a reporting cycle.

/// Number of trailing per-second samples in every counter window
pub const WINDOW_SECONDS: i64 = 600;

/// Events sampled when averaging consensus time
pub const CONSENSUS_TIME_SAMPLE_SIZE: usize = 100;

/// Longest accepted reporting cycle deadline (one day)
pub const MAX_CYCLE_TIMEOUT_SECONDS: u64 = 86_400;

/// Cache key prefixes for per-second and scalar counters
pub mod keys {
    pub const KEY_SEPARATOR: char = '|';

    // Scalar duration counters: t|{name}|{token}
    pub const DURATION_PREFIX: &str = "t";
    pub const DURATION_AGGREGATE: &str = "aggregate";
    pub const DURATION_FIND_CONSENSUS: &str = "findConsensus";
    pub const DURATION_RECENT_HISTORY_MERGE_ONLY: &str = "recentHistoryMergeOnly";

    // Windowed counters: {prefix}|{token}|{epoch_second}
    pub const OPS_LOCAL: &str = "ocl";
    pub const OPS_PEER: &str = "ocp";
    pub const EVENTS_LOCAL: &str = "ecl";
    pub const EVENTS_PEER: &str = "ecp";
}

/// Task names used by the reporting graph
pub mod tasks {
    pub const DURATION: &str = "duration";
    pub const OPS_PER_SECOND: &str = "ops_per_second";
    pub const EVENTS_PER_SECOND_LOCAL: &str = "events_per_second_local";
    pub const EVENTS_PER_SECOND_PEER: &str = "events_per_second_peer";
    pub const LEDGER_NODE: &str = "ledger_node";
    pub const CREATOR: &str = "creator";
    pub const AVG_CONSENSUS_TIME: &str = "avg_consensus_time";
    pub const LATEST_SUMMARY: &str = "latest_summary";
    pub const EVENTS_OUTSTANDING: &str = "events_outstanding";
    pub const EVENTS_TOTAL: &str = "events_total";
    pub const MERGE_EVENTS_TOTAL: &str = "merge_events_total";
    pub const MERGE_EVENTS_OUTSTANDING: &str = "merge_events_outstanding";
    pub const SEND_STATUS: &str = "send_status";

    /// Every task whose output feeds the published snapshot
    pub const METRIC_TASKS: [&str; 11] = [
        AVG_CONSENSUS_TIME,
        CREATOR,
        DURATION,
        EVENTS_TOTAL,
        EVENTS_OUTSTANDING,
        EVENTS_PER_SECOND_LOCAL,
        EVENTS_PER_SECOND_PEER,
        LATEST_SUMMARY,
        MERGE_EVENTS_OUTSTANDING,
        MERGE_EVENTS_TOTAL,
        OPS_PER_SECOND,
    ];
}

/// HTTP paths on the primary/collector
pub mod paths {
    pub const GENESIS: &str = "genesis";
    pub const NODES: &str = "nodes";
    pub const LOG_APP: &str = "log/app";
    pub const MONGO: &str = "mongo";
}
