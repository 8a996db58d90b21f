use crate::error::{ReporterError, ReporterResult};
use crate::ledger::{ConsensusIdentity, LedgerNode};
use crate::metrics::{DurationMetrics, LocalPeerRates};
use crate::orchestration::TaskResults;
use std::sync::Arc;

use super::snapshot::StatusSnapshot;

/// Output of a reporting task
#[derive(Debug, Clone)]
pub enum ReportValue {
    Durations(DurationMetrics),
    Rates(LocalPeerRates),
    Rate(i64),
    LedgerNode(Arc<dyn LedgerNode>),
    Identity(ConsensusIdentity),
    Average(f64),
    Count(u64),
    Summary(serde_json::Value),
    Published(StatusSnapshot),
}

impl ReportValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Durations(_) => "durations",
            Self::Rates(_) => "rates",
            Self::Rate(_) => "rate",
            Self::LedgerNode(_) => "ledger node",
            Self::Identity(_) => "identity",
            Self::Average(_) => "average",
            Self::Count(_) => "count",
            Self::Summary(_) => "summary",
            Self::Published(_) => "published snapshot",
        }
    }
}

/// Typed lookups into a reporting result map
pub trait ReportResultsExt {
    fn durations(&self, task: &str) -> ReporterResult<DurationMetrics>;
    fn rates(&self, task: &str) -> ReporterResult<LocalPeerRates>;
    fn rate(&self, task: &str) -> ReporterResult<i64>;
    fn ledger_node(&self, task: &str) -> ReporterResult<Arc<dyn LedgerNode>>;
    fn identity(&self, task: &str) -> ReporterResult<ConsensusIdentity>;
    fn average(&self, task: &str) -> ReporterResult<f64>;
    fn count(&self, task: &str) -> ReporterResult<u64>;
    fn summary(&self, task: &str) -> ReporterResult<serde_json::Value>;
}

fn pick<R>(
    results: &TaskResults<ReportValue>,
    task: &str,
    expected: &str,
    extract: impl FnOnce(&ReportValue) -> Option<R>,
) -> ReporterResult<R> {
    let value = results.require(task)?;
    extract(value).ok_or_else(|| ReporterError::unexpected_result(task, expected))
}

impl ReportResultsExt for TaskResults<ReportValue> {
    fn durations(&self, task: &str) -> ReporterResult<DurationMetrics> {
        pick(self, task, "durations", |value| match value {
            ReportValue::Durations(d) => Some(*d),
            _ => None,
        })
    }

    fn rates(&self, task: &str) -> ReporterResult<LocalPeerRates> {
        pick(self, task, "rates", |value| match value {
            ReportValue::Rates(r) => Some(*r),
            _ => None,
        })
    }

    fn rate(&self, task: &str) -> ReporterResult<i64> {
        pick(self, task, "rate", |value| match value {
            ReportValue::Rate(r) => Some(*r),
            _ => None,
        })
    }

    fn ledger_node(&self, task: &str) -> ReporterResult<Arc<dyn LedgerNode>> {
        pick(self, task, "ledger node", |value| match value {
            ReportValue::LedgerNode(node) => Some(Arc::clone(node)),
            _ => None,
        })
    }

    fn identity(&self, task: &str) -> ReporterResult<ConsensusIdentity> {
        pick(self, task, "identity", |value| match value {
            ReportValue::Identity(identity) => Some(identity.clone()),
            _ => None,
        })
    }

    fn average(&self, task: &str) -> ReporterResult<f64> {
        pick(self, task, "average", |value| match value {
            ReportValue::Average(avg) => Some(*avg),
            _ => None,
        })
    }

    fn count(&self, task: &str) -> ReporterResult<u64> {
        pick(self, task, "count", |value| match value {
            ReportValue::Count(count) => Some(*count),
            _ => None,
        })
    }

    fn summary(&self, task: &str) -> ReporterResult<serde_json::Value> {
        pick(self, task, "summary", |value| match value {
            ReportValue::Summary(summary) => Some(summary.clone()),
            _ => None,
        })
    }
}
