//! # Reporting
//!
//! One reporting cycle reads node counters and ledger statistics through a
//! [`TaskGraph`](crate::orchestration::TaskGraph), folds the results into a
//! [`StatusSnapshot`] and posts it to the collector.

pub mod reporter;
pub mod snapshot;
pub mod tasks;
pub mod value;

pub use reporter::{nearest_epoch_second, CycleOutcome, CycleReport, StatusReporter};
pub use snapshot::{
    system_load_average, EventMetrics, LoadSampler, NodeStatus, PublishContext,
    SnapshotAssembler, StatusSnapshot,
};
pub use tasks::{build_reporting_tasks, CycleInputs, ReportingEnvironment};
pub use value::{ReportResultsExt, ReportValue};
