//! Counter store implementations

mod memory;
#[cfg(feature = "cache-redis")]
mod redis;

pub use memory::InMemoryCounterStore;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCounterStore;

use super::errors::{CacheError, CacheResult};
use super::traits::CounterStore;
use crate::config::CacheConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the configured counter store; an unreachable backend is an error
pub async fn from_config(config: &CacheConfig) -> CacheResult<Arc<dyn CounterStore>> {
    match config.backend.as_str() {
        "redis" | "dragonfly" => connect_redis(config).await,
        "memory" | "in-memory" => {
            info!(backend = "memory", "In-memory counter store initialized");
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
        other => {
            warn!(backend = other, "Unknown counter store backend");
            Err(CacheError::ConnectionError(format!(
                "Unknown cache backend '{other}'"
            )))
        }
    }
}

#[cfg(feature = "cache-redis")]
async fn connect_redis(config: &CacheConfig) -> CacheResult<Arc<dyn CounterStore>> {
    let store = RedisCounterStore::connect(&config.url).await?;
    info!(backend = "redis", "Counter store initialized successfully");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "cache-redis"))]
async fn connect_redis(_config: &CacheConfig) -> CacheResult<Arc<dyn CounterStore>> {
    Err(CacheError::ConnectionError(
        "Redis backend requested but the 'cache-redis' feature is not enabled".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let config = CacheConfig {
            backend: "memory".to_string(),
            ..CacheConfig::default()
        };
        let store = from_config(&config).await.unwrap();
        assert_eq!(store.provider_name(), "memory");
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let config = CacheConfig {
            backend: "floppy".to_string(),
            ..CacheConfig::default()
        };
        assert!(from_config(&config).await.is_err());
    }
}
