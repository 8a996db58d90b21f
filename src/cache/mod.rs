//! # Counter Cache Module
//!
//! Read access to the key-value cache where ledger nodes record their
//! per-second operation/event counters and scalar duration timings.
//!
//! ## Architecture
//!
//! ```text
//! Arc<dyn CounterStore>
//!   ├── RedisCounterStore     <- ConnectionManager-based async Redis (feature "cache-redis")
//!   └── InMemoryCounterStore  <- DashMap-backed, single process / tests
//! ```
//!
//! Every read is a batched `mget`, so a whole counter window costs one round
//! trip regardless of its size.

pub mod errors;
pub mod providers;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use providers::InMemoryCounterStore;
#[cfg(feature = "cache-redis")]
pub use providers::RedisCounterStore;
pub use traits::CounterStore;
