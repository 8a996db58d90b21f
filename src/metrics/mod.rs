//! # Node Metrics
//!
//! Aggregation of cache-resident node counters into the rates and durations
//! published in a status snapshot.

pub mod types;
pub mod window;

pub use types::{DurationMetrics, LocalPeerRates};
pub use window::{
    average, parse_counter, rounded_average, sum, CounterWindow, WindowedCounterReader,
};
