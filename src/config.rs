//! # Configuration
//!
//! Layered reporter configuration: an optional TOML file named by
//! `LEDGER_STATUS_CONFIG_PATH`, overridden by `LEDGER_STATUS__SECTION__KEY`
//! environment variables (for example `LEDGER_STATUS__NODE__LABEL`).
//! Every section has defaults, so an empty environment yields a config that
//! only lacks the node identity.

use crate::constants::MAX_CYCLE_TIMEOUT_SECONDS;
use crate::error::{ReporterError, ReporterResult};
use crate::key_namer::token_for;
use crate::reporting::PublishContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "LEDGER_STATUS_CONFIG_PATH";
pub const ENV_PREFIX: &str = "LEDGER_STATUS";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    pub server: ServerConfig,
    pub node: NodeConfig,
    pub collector: CollectorConfig,
    pub cache: CacheConfig,
    pub reporting: ReportingConfig,
    pub logging: LoggingConfig,
}

/// Local web server the node runs; used to derive published URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_uri: String,
    /// Private hostname
    pub domain: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_uri: "https://localhost:18443".to_string(),
            domain: "localhost".to_string(),
            port: 18443,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub label: String,
    pub ledger_node_id: String,
    pub public_hostname: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            ledger_node_id: String::new(),
            public_hostname: "localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Primary node serving `/genesis`
    pub primary_base_url: String,
    /// Collector receiving `/nodes`; the primary when unset
    pub collector_url: Option<String>,
    pub request_timeout_ms: u64,
    pub accept_invalid_certs: bool,
}

impl CollectorConfig {
    pub fn collector_url(&self) -> &str {
        self.collector_url
            .as_deref()
            .unwrap_or(&self.primary_base_url)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            primary_base_url: "https://localhost:18443/ledger-test".to_string(),
            collector_url: None,
            request_timeout_ms: 30_000,
            accept_invalid_certs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// "redis" (also "dragonfly") or "memory"
    pub backend: String,
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "redis".to_string(),
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Upper bound on one reporting cycle
    pub cycle_timeout_seconds: u64,
}

impl ReportingConfig {
    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_seconds)
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            cycle_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ReporterConfig {
    /// Load from `LEDGER_STATUS_CONFIG_PATH` (if set) and the environment
    pub fn from_env() -> ReporterResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load(path.as_deref())
    }

    /// Load from an explicit file (which must exist) plus the environment
    pub fn load(path: Option<&Path>) -> ReporterResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading reporter configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReporterResult<()> {
        if self.node.ledger_node_id.trim().is_empty() {
            return Err(ReporterError::configuration("node.ledger_node_id is required"));
        }
        token_for(&self.node.ledger_node_id).map_err(|e| {
            ReporterError::configuration(format!("node.ledger_node_id: {e}"))
        })?;

        if self.node.public_hostname.trim().is_empty() {
            return Err(ReporterError::configuration("node.public_hostname is required"));
        }
        if self.server.port == 0 {
            return Err(ReporterError::configuration("server.port must be non-zero"));
        }

        validate_url("collector.primary_base_url", &self.collector.primary_base_url)?;
        if let Some(collector_url) = &self.collector.collector_url {
            validate_url("collector.collector_url", collector_url)?;
        }

        if self.collector.request_timeout_ms == 0 {
            return Err(ReporterError::configuration(
                "collector.request_timeout_ms must be positive",
            ));
        }
        if self.reporting.cycle_timeout_seconds == 0 {
            return Err(ReporterError::configuration(
                "reporting.cycle_timeout_seconds must be positive",
            ));
        }
        if self.reporting.cycle_timeout_seconds > MAX_CYCLE_TIMEOUT_SECONDS {
            return Err(ReporterError::configuration(format!(
                "reporting.cycle_timeout_seconds must be at most {MAX_CYCLE_TIMEOUT_SECONDS}"
            )));
        }

        Ok(())
    }

    /// Static publication metadata derived from the server and node sections
    pub fn publish_context(&self) -> PublishContext {
        PublishContext {
            base_uri: self.server.base_uri.clone(),
            label: self.node.label.clone(),
            ledger_node_id: self.node.ledger_node_id.clone(),
            public_hostname: self.node.public_hostname.clone(),
            private_hostname: self.server.domain.clone(),
            server_port: self.server.port,
        }
    }
}

fn validate_url(field: &str, value: &str) -> ReporterResult<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ReporterError::configuration(format!("{field}: invalid URL '{value}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ReporterError::configuration(format!(
            "{field}: unsupported scheme '{other}'"
        ))),
    }
}
