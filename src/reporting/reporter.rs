//! # Status Reporter
//!
//! Runs one reporting cycle end to end: derive the node token, build the
//! reporting graph for the current second, run it under the cycle deadline
//! and hand back the snapshot that was published. Scheduling cycles is left
//! to the caller.

use super::snapshot::{PublishContext, SnapshotAssembler, StatusSnapshot};
use super::tasks::{build_reporting_tasks, CycleInputs, ReportingEnvironment};
use super::value::ReportValue;
use crate::cache;
use crate::client::{GenesisBlock, StatusPublisher};
use crate::config::ReporterConfig;
use crate::constants::tasks;
use crate::error::{ReporterError, ReporterResult};
use crate::key_namer::KeyNamer;
use crate::ledger::LedgerNodeRegistry;
use crate::metrics::WindowedCounterReader;
use crate::orchestration::TaskGraph;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// How a reporting cycle ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    Published,
    Failed { error: String },
}

/// Record of the most recent reporting cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Published)
    }
}

#[derive(Debug)]
pub struct StatusReporter {
    env: ReportingEnvironment,
    context: PublishContext,
    namer: KeyNamer,
    primary_base_url: String,
    collector_url: String,
    cycle_timeout: Duration,
    last_cycle: RwLock<Option<CycleReport>>,
}

impl StatusReporter {
    pub fn new(
        env: ReportingEnvironment,
        context: PublishContext,
        primary_base_url: impl Into<String>,
        collector_url: impl Into<String>,
        cycle_timeout: Duration,
    ) -> ReporterResult<Self> {
        let namer = KeyNamer::for_identifier(&context.ledger_node_id)?;
        Ok(Self {
            env,
            context,
            namer,
            primary_base_url: primary_base_url.into(),
            collector_url: collector_url.into(),
            cycle_timeout,
            last_cycle: RwLock::new(None),
        })
    }

    /// Wire the configured cache backend and HTTP client around `registry`
    pub async fn from_config(
        config: &ReporterConfig,
        registry: Arc<dyn LedgerNodeRegistry>,
    ) -> ReporterResult<Self> {
        config.validate()?;

        let store = cache::providers::from_config(&config.cache).await?;
        let env = ReportingEnvironment {
            reader: WindowedCounterReader::new(store),
            registry,
            assembler: SnapshotAssembler::new(),
            publisher: StatusPublisher::new(&config.collector)?,
        };

        Self::new(
            env,
            config.publish_context(),
            config.collector.primary_base_url.clone(),
            config.collector.collector_url(),
            config.reporting.cycle_timeout(),
        )
    }

    pub fn token(&self) -> &str {
        self.namer.token()
    }

    /// Run one cycle against the current wall-clock second
    pub async fn report_once(&self) -> ReporterResult<StatusSnapshot> {
        self.report_at(nearest_epoch_second(Utc::now())).await
    }

    /// Run one cycle with counter windows ending at `now_epoch_seconds`
    pub async fn report_at(&self, now_epoch_seconds: i64) -> ReporterResult<StatusSnapshot> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!(
            "reporting_cycle",
            %cycle_id,
            ledger_node_id = %self.context.ledger_node_id
        );

        async move {
            let started_at = Utc::now();
            info!(now_epoch_seconds, "Sending status");

            let result = self.run_cycle(now_epoch_seconds).await;

            let outcome = match &result {
                Ok(_) => CycleOutcome::Published,
                Err(e) => {
                    error!(error = %e, "Reporting cycle failed");
                    CycleOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            *self.last_cycle.write() = Some(CycleReport {
                cycle_id,
                started_at,
                finished_at: Utc::now(),
                outcome,
            });

            result
        }
        .instrument(span)
        .await
    }

    async fn run_cycle(&self, now_epoch_seconds: i64) -> ReporterResult<StatusSnapshot> {
        let inputs = CycleInputs {
            namer: self.namer.clone(),
            now_epoch_seconds,
            context: self.context.clone(),
            collector_url: self.collector_url.clone(),
        };

        let graph = TaskGraph::from_tasks(build_reporting_tasks(&self.env, &inputs))?;
        let results = graph.run_with_deadline(self.cycle_timeout).await?;

        match results.require(tasks::SEND_STATUS)? {
            ReportValue::Published(snapshot) => {
                info!(
                    events_total = snapshot.status.events.total,
                    events_outstanding = snapshot.status.events.outstanding,
                    "Reporting cycle complete"
                );
                Ok(snapshot.clone())
            }
            other => Err(ReporterError::unexpected_result(
                tasks::SEND_STATUS,
                format!("published snapshot, got {}", other.kind()),
            )),
        }
    }

    /// Fetch the genesis block from the configured primary
    pub async fn fetch_genesis(&self) -> ReporterResult<GenesisBlock> {
        self.env
            .publisher
            .fetch_genesis(&self.primary_base_url)
            .await
    }

    /// Outcome of the most recent cycle, if any has run
    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.last_cycle.read().clone()
    }
}

/// Epoch second closest to `now`; half a second rounds up
pub fn nearest_epoch_second(now: DateTime<Utc>) -> i64 {
    (now.timestamp_millis() + 500).div_euclid(1000)
}
