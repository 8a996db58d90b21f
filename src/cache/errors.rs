//! Cache error types

use crate::error::ReporterError;
use thiserror::Error;

/// Errors that can occur while reading counters from the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Cache operation timed out
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for ReporterError {
    fn from(error: CacheError) -> Self {
        ReporterError::CacheUnavailable(error.to_string())
    }
}
