//! In-process counter store
//!
//! Backed by a `DashMap`. Used for single-process deployments without a cache
//! server and as a deterministic stand-in during tests.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::CounterStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    entries: DashMap<String, String>,
    round_trips: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value under `key`, replacing any previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Add `delta` to the integer counter at `key`, creating it at zero
    pub fn increment(&self, key: impl Into<String>, delta: i64) -> i64 {
        let mut entry = self.entries.entry(key.into()).or_insert_with(|| "0".into());
        let next = entry.parse::<i64>().unwrap_or(0) + delta;
        *entry = next.to_string();
        next
    }

    /// Simulate the backend going away; subsequent reads fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `mget` round trips served so far
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn mget(&self, keys: &[String]) -> CacheResult<Vec<Option<String>>> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError(
                "in-memory store marked unavailable".to_string(),
            ));
        }

        let values: Vec<Option<String>> = keys
            .iter()
            .map(|key| self.entries.get(key).map(|v| v.value().clone()))
            .collect();

        debug!(
            requested = keys.len(),
            hits = values.iter().filter(|v| v.is_some()).count(),
            "In-memory MGET"
        );

        Ok(values)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
