//! # Reporting Tasks
//!
//! The concrete task graph of one reporting cycle.
//!
//! ```text
//! duration ──────────────────┐
//! ops_per_second ────────────┤
//! events_per_second_local ───┤
//! events_per_second_peer ────┤
//! ledger_node ─┬─ creator ─┬─┤
//!              ├───────────┴─ avg_consensus_time ─┤
//!              ├─ latest_summary ─────────────────┤
//!              ├─ events_outstanding ─────────────┤
//!              ├─ events_total ───────────────────┤
//!              ├─ merge_events_total ─────────────┤
//!              └─ merge_events_outstanding ───────┴─ send_status
//! ```

use super::snapshot::{PublishContext, SnapshotAssembler};
use super::value::{ReportResultsExt, ReportValue};
use crate::client::StatusPublisher;
use crate::constants::{keys, tasks, CONSENSUS_TIME_SAMPLE_SIZE};
use crate::key_namer::KeyNamer;
use crate::ledger::{ConsensusTimeQuery, EventFilter, LedgerNodeRegistry};
use crate::metrics::WindowedCounterReader;
use crate::orchestration::{Task, TaskResults};
use std::sync::Arc;
use tracing::debug;

/// Long-lived collaborators shared by every cycle
#[derive(Debug, Clone)]
pub struct ReportingEnvironment {
    pub reader: WindowedCounterReader,
    pub registry: Arc<dyn LedgerNodeRegistry>,
    pub assembler: SnapshotAssembler,
    pub publisher: StatusPublisher,
}

/// Per-cycle inputs
#[derive(Debug, Clone)]
pub struct CycleInputs {
    pub namer: KeyNamer,
    pub now_epoch_seconds: i64,
    pub context: PublishContext,
    pub collector_url: String,
}

/// Build every task of one reporting cycle, ending in `send_status`
pub fn build_reporting_tasks(
    env: &ReportingEnvironment,
    cycle: &CycleInputs,
) -> Vec<Task<ReportValue>> {
    let mut graph = counter_tasks(env, cycle);
    graph.extend(ledger_tasks(env, cycle));
    graph.push(send_status(env, cycle));
    graph
}

fn counter_tasks(env: &ReportingEnvironment, cycle: &CycleInputs) -> Vec<Task<ReportValue>> {
    let now = cycle.now_epoch_seconds;

    let reader = env.reader.clone();
    let namer = cycle.namer.clone();
    let duration = Task::new(tasks::DURATION, move |_| async move {
        Ok(ReportValue::Durations(reader.read_durations(&namer).await?))
    });

    let reader = env.reader.clone();
    let token = cycle.namer.token().to_string();
    let ops = Task::new(tasks::OPS_PER_SECOND, move |_| async move {
        let rates = reader
            .read_local_peer(keys::OPS_LOCAL, keys::OPS_PEER, &token, now)
            .await?;
        Ok(ReportValue::Rates(rates))
    });

    vec![
        duration,
        ops,
        rate_task(env, cycle, tasks::EVENTS_PER_SECOND_LOCAL, keys::EVENTS_LOCAL),
        rate_task(env, cycle, tasks::EVENTS_PER_SECOND_PEER, keys::EVENTS_PEER),
    ]
}

fn rate_task(
    env: &ReportingEnvironment,
    cycle: &CycleInputs,
    name: &'static str,
    prefix: &'static str,
) -> Task<ReportValue> {
    let reader = env.reader.clone();
    let token = cycle.namer.token().to_string();
    let now = cycle.now_epoch_seconds;
    Task::new(name, move |_| async move {
        Ok(ReportValue::Rate(reader.read_rate(prefix, &token, now).await?))
    })
}

fn ledger_tasks(env: &ReportingEnvironment, cycle: &CycleInputs) -> Vec<Task<ReportValue>> {
    let registry = Arc::clone(&env.registry);
    let ledger_node_id = cycle.context.ledger_node_id.clone();
    let ledger_node = Task::new(tasks::LEDGER_NODE, move |_| async move {
        let node = registry.get(&ledger_node_id).await?;
        debug!(ledger_node_id = %node.id(), "Resolved ledger node");
        Ok(ReportValue::LedgerNode(node))
    });

    let creator = Task::new(tasks::CREATOR, |inputs: TaskResults<ReportValue>| async move {
        let node = inputs.ledger_node(tasks::LEDGER_NODE)?;
        Ok(ReportValue::Identity(node.consensus_identity().await?))
    })
    .depends_on([tasks::LEDGER_NODE]);

    let avg_consensus_time = Task::new(
        tasks::AVG_CONSENSUS_TIME,
        |inputs: TaskResults<ReportValue>| async move {
            let node = inputs.ledger_node(tasks::LEDGER_NODE)?;
            let creator = inputs.identity(tasks::CREATOR)?;
            let average = node
                .average_consensus_time(ConsensusTimeQuery {
                    creator: creator.id,
                    sample_size: CONSENSUS_TIME_SAMPLE_SIZE,
                })
                .await?;
            Ok(ReportValue::Average(average.unwrap_or(0.0)))
        },
    )
    .depends_on([tasks::CREATOR, tasks::LEDGER_NODE]);

    let latest_summary = Task::new(
        tasks::LATEST_SUMMARY,
        |inputs: TaskResults<ReportValue>| async move {
            let node = inputs.ledger_node(tasks::LEDGER_NODE)?;
            Ok(ReportValue::Summary(node.latest_block_summary().await?))
        },
    )
    .depends_on([tasks::LEDGER_NODE]);

    vec![
        ledger_node,
        creator,
        avg_consensus_time,
        latest_summary,
        count_task(tasks::EVENTS_OUTSTANDING, EventFilter::outstanding()),
        count_task(tasks::EVENTS_TOTAL, EventFilter::all()),
        count_task(tasks::MERGE_EVENTS_TOTAL, EventFilter::merge()),
        count_task(tasks::MERGE_EVENTS_OUTSTANDING, EventFilter::merge_outstanding()),
    ]
}

fn count_task(name: &'static str, filter: EventFilter) -> Task<ReportValue> {
    Task::new(name, move |inputs: TaskResults<ReportValue>| async move {
        let node = inputs.ledger_node(tasks::LEDGER_NODE)?;
        let count = node.count_events(filter).await?;
        debug!(task = name, count, "Counted events");
        Ok(ReportValue::Count(count))
    })
    .depends_on([tasks::LEDGER_NODE])
}

fn send_status(env: &ReportingEnvironment, cycle: &CycleInputs) -> Task<ReportValue> {
    let assembler = env.assembler.clone();
    let publisher = env.publisher.clone();
    let context = cycle.context.clone();
    let collector_url = cycle.collector_url.clone();

    Task::new(
        tasks::SEND_STATUS,
        move |inputs: TaskResults<ReportValue>| async move {
            let snapshot = assembler.assemble(&inputs, &context)?;
            publisher.publish(&snapshot, &collector_url).await?;
            Ok(ReportValue::Published(snapshot))
        },
    )
    .depends_on(tasks::METRIC_TASKS)
}
