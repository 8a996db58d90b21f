//! Counter store trait definition

use super::errors::CacheResult;
use async_trait::async_trait;

/// Read side of the key-value cache holding node counters
///
/// Implemented by concrete cache providers (Redis, in-memory). Implementations
/// must be safe to share between concurrently running reporting tasks.
#[async_trait]
pub trait CounterStore: Send + Sync + std::fmt::Debug {
    /// Fetch every key in a single round trip
    ///
    /// The returned vector is positionally aligned with `keys`; absent keys
    /// are `None`.
    async fn mget(&self, keys: &[String]) -> CacheResult<Vec<Option<String>>>;

    /// Get the name of the cache provider
    fn provider_name(&self) -> &'static str;
}
