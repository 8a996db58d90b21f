//! # Structured Logging Module
//!
//! Console logging through a `tracing-subscriber` registry, either
//! human-readable or JSON lines for log shippers. `RUST_LOG` wins over the
//! configured level when set.

use crate::config::LoggingConfig;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging; later calls are no-ops
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let level = if config.level.trim().is_empty() {
            default_log_level(&environment).to_string()
        } else {
            config.level.clone()
        };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let registry = tracing_subscriber::registry();
        let result = if config.json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_current_span(true)
                        .with_span_list(false)
                        .with_filter(filter),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_filter(filter),
                )
                .try_init()
        };

        // A subscriber installed by the host application takes precedence
        if result.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            level = %level,
            json = config.json,
            "Structured logging initialized"
        );
    });
}

/// Current deployment environment name
pub fn get_environment() -> String {
    std::env::var("LEDGER_STATUS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_by_environment() {
        assert_eq!(default_log_level("production"), "info");
        assert_eq!(default_log_level("test"), "debug");
        assert_eq!(default_log_level("staging"), "debug");
    }

    #[test]
    fn test_initialization_is_idempotent() {
        let config = LoggingConfig::default();
        init_structured_logging(&config);
        init_structured_logging(&LoggingConfig {
            json: true,
            ..config
        });
        assert!(LOGGER_INITIALIZED.get().is_some());
    }
}
