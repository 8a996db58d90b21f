//! # Task Graph Types
//!
//! A [`Task`] is a named unit of asynchronous work with a set of
//! prerequisite task names. When it runs it receives a [`TaskResults`] view
//! containing exactly its prerequisites' outputs.

use crate::error::{ReporterError, ReporterResult};
use futures::future::BoxFuture;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Boxed future produced by a task body
pub type TaskFuture<T> = BoxFuture<'static, ReporterResult<T>>;

/// Task body: consumes its dependencies' results, yields its own
pub type TaskFn<T> = Box<dyn FnOnce(TaskResults<T>) -> TaskFuture<T> + Send>;

/// A named unit of asynchronous work in a [`TaskGraph`](super::TaskGraph)
pub struct Task<T> {
    name: String,
    dependencies: BTreeSet<String>,
    run: TaskFn<T>,
}

impl<T: Send + Sync + 'static> Task<T> {
    /// Create a task with no dependencies
    pub fn new<F, Fut>(name: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(TaskResults<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ReporterResult<T>> + Send + 'static,
    {
        Self {
            name: name.into(),
            dependencies: BTreeSet::new(),
            run: Box::new(move |inputs| -> TaskFuture<T> { Box::pin(run(inputs)) }),
        }
    }

    /// Add prerequisites; repeated names collapse into one
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }
}

impl<T> Task<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub(crate) fn into_parts(self) -> (String, BTreeSet<String>, TaskFn<T>) {
        (self.name, self.dependencies, self.run)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Completed task outputs keyed by task name
///
/// Values are shared, so handing a subset to a dependent task never clones
/// the underlying outputs.
pub struct TaskResults<T> {
    values: HashMap<String, Arc<T>>,
}

impl<T> TaskResults<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, task: &str) -> Option<&T> {
        self.values.get(task).map(Arc::as_ref)
    }

    /// Like [`get`](Self::get) but a missing entry is a `MissingResult` error
    pub fn require(&self, task: &str) -> ReporterResult<&T> {
        self.get(task)
            .ok_or_else(|| ReporterError::missing_result(task))
    }

    pub fn contains(&self, task: &str) -> bool {
        self.values.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Task names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn insert(&mut self, task: impl Into<String>, value: T) {
        self.values.insert(task.into(), Arc::new(value));
    }

    /// Shared view restricted to `tasks`; names without a result are skipped
    pub(crate) fn subset<'a>(&self, tasks: impl IntoIterator<Item = &'a String>) -> Self {
        let values = tasks
            .into_iter()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .map(|value| (name.clone(), Arc::clone(value)))
            })
            .collect();
        Self { values }
    }
}

impl<T> Default for TaskResults<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TaskResults<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TaskResults<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}
