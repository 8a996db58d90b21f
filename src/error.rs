//! Error types for the status reporter.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReporterError {
    #[error("Invalid ledger node identifier: {identifier:?}")]
    InvalidIdentifier { identifier: String },

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Task '{task}' is registered more than once")]
    DuplicateTask { task: String },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Required result '{task}' is missing")]
    MissingResult { task: String },

    #[error("Result '{task}' is not a {expected}")]
    UnexpectedResult { task: String, expected: String },

    #[error("Task '{task}' panicked or was aborted: {reason}")]
    TaskPanicked { task: String, reason: String },

    #[error("Could not retrieve genesis block: {reason}")]
    GenesisUnavailable {
        status: Option<u16>,
        reason: String,
    },

    #[error("Could not publish status: {reason}")]
    PublishFailed {
        status: Option<u16>,
        reason: String,
    },

    #[error("Storage error: {operation} - {reason}")]
    Storage { operation: String, reason: String },

    #[error("Timeout error for operation {operation}: {timeout_duration:?}")]
    Timeout {
        operation: String,
        timeout_duration: Duration,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ReporterError {
    pub fn invalid_identifier(identifier: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
        }
    }

    pub fn missing_result(task: impl Into<String>) -> Self {
        Self::MissingResult { task: task.into() }
    }

    pub fn unexpected_result(task: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            task: task.into(),
            expected: expected.into(),
        }
    }

    /// Wrap an error surfaced by the ledger storage collaborator
    pub fn storage(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::Storage {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub fn genesis_unavailable(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::GenesisUnavailable {
            status,
            reason: reason.into(),
        }
    }

    pub fn publish_failed(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::PublishFailed {
            status,
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }

    /// Whether the error came from the dependency graph itself rather than a task
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::CyclicDependency { .. }
                | Self::DuplicateTask { .. }
                | Self::UnknownDependency { .. }
                | Self::TaskPanicked { .. }
        )
    }
}

impl From<config::ConfigError> for ReporterError {
    fn from(error: config::ConfigError) -> Self {
        ReporterError::ConfigurationError(error.to_string())
    }
}

pub type ReporterResult<T> = std::result::Result<T, ReporterError>;
