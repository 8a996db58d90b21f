//! # Orchestration
//!
//! Dependency-driven execution of asynchronous tasks. A reporting cycle is
//! expressed as a [`TaskGraph`] of [`Task`]s; independent tasks run
//! concurrently on the tokio runtime and each task sees only the results of
//! the tasks it declared as prerequisites.

pub mod state;
pub mod task_graph;
pub mod types;

pub use state::{GraphState, TaskState};
pub use task_graph::{run_tasks, TaskGraph};
pub use types::{Task, TaskFn, TaskFuture, TaskResults};
