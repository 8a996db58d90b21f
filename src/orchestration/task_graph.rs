//! # Task Graph
//!
//! Runs a set of named asynchronous tasks with declared prerequisites, as
//! concurrently as their dependencies allow.
//!
//! ## Execution model
//!
//! - The whole graph is validated before anything runs: duplicate names,
//!   unknown prerequisites and cycles are rejected up front.
//! - A task is launched as soon as every prerequisite has completed, and is
//!   handed only those prerequisites' results.
//! - The first failure ends the run. Tasks already in flight are detached:
//!   they run to completion but their results are discarded, and nothing new
//!   is launched.
//! - An optional deadline bounds the whole run the same way.

use super::state::{GraphState, TaskState};
use super::types::{Task, TaskFn, TaskResults};
use crate::error::{ReporterError, ReporterResult};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::time::Duration;
use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

struct Node<T> {
    dependencies: BTreeSet<String>,
    run: Option<TaskFn<T>>,
    state: TaskState,
}

/// A validated-on-run dependency graph of [`Task`]s
pub struct TaskGraph<T> {
    order: Vec<String>,
    nodes: HashMap<String, Node<T>>,
}

impl<T: Send + Sync + 'static> TaskGraph<T> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    /// Build a graph from a task list, rejecting duplicate names
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task<T>>) -> ReporterResult<Self> {
        let mut graph = Self::new();
        for task in tasks {
            graph.add_task(task)?;
        }
        Ok(graph)
    }

    pub fn add_task(&mut self, task: Task<T>) -> ReporterResult<()> {
        if self.nodes.contains_key(task.name()) {
            return Err(ReporterError::DuplicateTask {
                task: task.name().to_string(),
            });
        }

        let (name, dependencies, run) = task.into_parts();
        self.order.push(name.clone());
        self.nodes.insert(
            name,
            Node {
                dependencies,
                run: Some(run),
                state: TaskState::Pending,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn task_names(&self) -> &[String] {
        &self.order
    }

    /// Reject unknown prerequisites and cycles
    pub fn validate(&self) -> ReporterResult<()> {
        for name in &self.order {
            for dependency in &self.nodes[name].dependencies {
                if !self.nodes.contains_key(dependency) {
                    return Err(ReporterError::UnknownDependency {
                        task: name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(ReporterError::CyclicDependency { cycle });
        }

        Ok(())
    }

    /// Group tasks into levels that could run together
    ///
    /// Level `n` holds tasks whose deepest prerequisite chain has length `n`.
    /// Names within a level keep insertion order.
    pub fn execution_levels(&self) -> ReporterResult<Vec<Vec<String>>> {
        self.validate()?;

        let mut in_degree: HashMap<&str, usize> = self
            .order
            .iter()
            .map(|name| (name.as_str(), self.nodes[name].dependencies.len()))
            .collect();
        let dependents = self.dependents();

        let mut levels = Vec::new();
        let mut current: Vec<String> = self
            .order
            .iter()
            .filter(|name| in_degree[name.as_str()] == 0)
            .cloned()
            .collect();

        while !current.is_empty() {
            let mut next = Vec::new();
            for name in &current {
                for dependent in dependents.get(name.as_str()).into_iter().flatten() {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.push(dependent.clone());
                        }
                    }
                }
            }
            next.sort_by_key(|name| self.position(name));
            levels.push(std::mem::replace(&mut current, next));
        }

        Ok(levels)
    }

    /// Run every task and return all results
    pub async fn run(self) -> ReporterResult<TaskResults<T>> {
        self.execute(None).await
    }

    /// Run every task, failing with `Timeout` if the graph has not finished
    /// within `deadline`
    pub async fn run_with_deadline(self, deadline: Duration) -> ReporterResult<TaskResults<T>> {
        self.execute(Some(deadline)).await
    }

    #[instrument(skip(self), fields(tasks = self.order.len()))]
    async fn execute(mut self, deadline: Option<Duration>) -> ReporterResult<TaskResults<T>> {
        self.validate()?;

        let total = self.order.len();
        // A deadline past the clock's range is no deadline at all
        let deadline_at = deadline.and_then(|d| Instant::now().checked_add(d));
        let dependents = self.dependents_owned();
        let mut remaining: HashMap<String, usize> = self
            .order
            .iter()
            .map(|name| (name.clone(), self.nodes[name].dependencies.len()))
            .collect();

        let mut results = TaskResults::new();
        let mut join_set: JoinSet<(String, ReporterResult<T>)> = JoinSet::new();
        let mut in_flight: HashMap<Id, String> = HashMap::new();
        let mut graph_state = GraphState::Running;

        let ready: VecDeque<String> = self
            .order
            .iter()
            .filter(|name| remaining[*name] == 0)
            .cloned()
            .collect();
        self.launch(ready, &results, &mut join_set, &mut in_flight);

        while results.len() < total {
            let joined = match deadline_at {
                Some(at) => {
                    let outcome =
                        tokio::time::timeout_at(at, join_set.join_next_with_id()).await;
                    match outcome {
                        Ok(joined) => joined,
                        Err(_) => {
                            graph_state = GraphState::Failed;
                            let pending: Vec<&str> =
                                in_flight.values().map(String::as_str).collect();
                            warn!(
                                state = %graph_state,
                                in_flight = ?pending,
                                "Task graph deadline elapsed"
                            );
                            join_set.detach_all();
                            return Err(ReporterError::Timeout {
                                operation: "task_graph".to_string(),
                                timeout_duration: deadline.unwrap_or_default(),
                            });
                        }
                    }
                }
                None => join_set.join_next_with_id().await,
            };

            let Some(joined) = joined else {
                // Validation guarantees every task eventually becomes ready
                break;
            };

            match joined {
                Ok((id, (name, Ok(value)))) => {
                    in_flight.remove(&id);
                    self.set_state(&name, TaskState::Done);
                    debug!(task = %name, "Task completed");
                    results.insert(name.clone(), value);

                    let mut ready = VecDeque::new();
                    for dependent in dependents.get(&name).into_iter().flatten() {
                        if let Some(count) = remaining.get_mut(dependent) {
                            *count -= 1;
                            if *count == 0 {
                                ready.push_back(dependent.clone());
                            }
                        }
                    }
                    if graph_state.accepts_new_tasks() {
                        self.launch(ready, &results, &mut join_set, &mut in_flight);
                    }
                }
                Ok((id, (name, Err(err)))) => {
                    in_flight.remove(&id);
                    self.set_state(&name, TaskState::Failed);
                    graph_state = GraphState::Failed;
                    error!(
                        task = %name,
                        state = %graph_state,
                        error = %err,
                        detached = in_flight.len(),
                        "Task failed; abandoning graph"
                    );
                    join_set.detach_all();
                    return Err(err);
                }
                Err(join_error) => {
                    let name = in_flight
                        .remove(&join_error.id())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    self.set_state(&name, TaskState::Failed);
                    graph_state = GraphState::Failed;
                    error!(
                        task = %name,
                        state = %graph_state,
                        error = %join_error,
                        detached = in_flight.len(),
                        "Task panicked; abandoning graph"
                    );
                    join_set.detach_all();
                    return Err(ReporterError::TaskPanicked {
                        task: name,
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        if results.len() < total {
            let missing = self
                .order
                .iter()
                .find(|name| !results.contains(name))
                .cloned()
                .unwrap_or_default();
            return Err(ReporterError::missing_result(missing));
        }

        graph_state = GraphState::Complete;
        info!(state = %graph_state, tasks = total, "Task graph finished");
        Ok(results)
    }

    fn launch(
        &mut self,
        mut ready: VecDeque<String>,
        results: &TaskResults<T>,
        join_set: &mut JoinSet<(String, ReporterResult<T>)>,
        in_flight: &mut HashMap<Id, String>,
    ) {
        while let Some(name) = ready.pop_front() {
            let Some(node) = self.nodes.get_mut(&name) else {
                continue;
            };
            let Some(run) = node.run.take() else {
                continue;
            };

            debug_assert!(node.dependencies.iter().all(|dep| results.contains(dep)));
            let inputs = results.subset(&node.dependencies);
            node.state = TaskState::Running;
            debug!(task = %name, inputs = inputs.len(), "Launching task");

            let future = run(inputs);
            let task_name = name.clone();
            let handle = join_set.spawn(async move { (task_name, future.await) });
            in_flight.insert(handle.id(), name);
        }
    }

    fn set_state(&mut self, name: &str, state: TaskState) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.state = state;
        }
    }

    fn position(&self, name: &str) -> usize {
        self.order
            .iter()
            .position(|candidate| candidate == name)
            .unwrap_or(usize::MAX)
    }

    fn dependents(&self) -> HashMap<&str, Vec<String>> {
        let mut dependents: HashMap<&str, Vec<String>> = HashMap::new();
        for name in &self.order {
            for dependency in &self.nodes[name].dependencies {
                dependents
                    .entry(dependency.as_str())
                    .or_default()
                    .push(name.clone());
            }
        }
        dependents
    }

    fn dependents_owned(&self) -> HashMap<String, Vec<String>> {
        self.dependents()
            .into_iter()
            .map(|(name, list)| (name.to_string(), list))
            .collect()
    }

    /// Depth-first search over prerequisite edges; returns the first cycle
    /// found as a closed path (`a -> b -> a`)
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashMap<&str, TaskState> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();

        for name in &self.order {
            if let Some(cycle) = self.visit(name, &mut visited, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashMap<&'a str, TaskState>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        // Running marks "on the current path", Done marks "fully explored"
        match visited.get(name) {
            Some(TaskState::Done) => return None,
            Some(TaskState::Running) => {
                let start = path.iter().position(|entry| *entry == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            _ => {}
        }

        visited.insert(name, TaskState::Running);
        path.push(name);

        if let Some(node) = self.nodes.get(name) {
            for dependency in &node.dependencies {
                if let Some(cycle) = self.visit(dependency, visited, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        visited.insert(name, TaskState::Done);
        None
    }
}

impl<T: Send + Sync + 'static> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TaskGraph<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<(&str, TaskState)> = self
            .order
            .iter()
            .filter_map(|name| self.nodes.get(name).map(|node| (name.as_str(), node.state)))
            .collect();
        f.debug_struct("TaskGraph").field("tasks", &states).finish()
    }
}

/// Build and run a graph in one step
pub async fn run_tasks<T: Send + Sync + 'static>(
    tasks: impl IntoIterator<Item = Task<T>>,
) -> ReporterResult<TaskResults<T>> {
    TaskGraph::from_tasks(tasks)?.run().await
}
