//! Adaptive executor.
//!
//! Drives a DAG wave by wave: every node in a wave is dispatched
//! concurrently (bounded by `max_parallelism`), and the coordinator
//! suspends only at wave boundaries. The ready frontier is recomputed
//! after every wave rather than planned upfront, because guard pruning
//! and partial failure change the remaining subgraph mid-run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use tygent_core::error::RuntimeError;
use tygent_core::types::{
    Dag, ExecutionResult, Node, NodeId, NodeKind, NodeOutcome, SkipReason, ValueMap,
};
use tygent_core::{tygent_node, tygent_sched};

use crate::executor::cancel::CancelHandle;
use crate::executor::dispatcher::NodeDispatcher;
use crate::executor::handlers;
use crate::executor::ExecutionContext;
use crate::scheduler::ExecutorConfig;

/// Early-stop hook evaluated after each wave.
#[derive(Clone)]
pub struct EarlyStop {
    threshold: f64,
    signal: Arc<dyn Fn(&HashMap<NodeId, NodeOutcome>) -> f64 + Send + Sync>,
}

impl EarlyStop {
    /// Builds a hook that stops once `signal` reaches `threshold`.
    pub fn new<F>(threshold: f64, signal: F) -> Self
    where
        F: Fn(&HashMap<NodeId, NodeOutcome>) -> f64 + Send + Sync + 'static,
    {
        EarlyStop {
            threshold,
            signal: Arc::new(signal),
        }
    }

    /// True when the convergence signal has reached the threshold.
    pub fn should_stop(&self, results: &HashMap<NodeId, NodeOutcome>) -> bool {
        (self.signal)(results) >= self.threshold
    }
}

/// What one dispatched task reports back to the coordinator.
enum TaskOutput {
    /// A single node settled.
    Single {
        id: NodeId,
        result: Result<ValueMap, RuntimeError>,
        duration: Duration,
    },
    /// A batch group settled; one entry per node, in group order.
    Batch {
        results: Vec<(NodeId, Result<ValueMap, RuntimeError>)>,
        duration: Duration,
    },
    /// The task observed cancellation before settling.
    Cancelled { ids: Vec<NodeId> },
}

/// Executes a DAG against concrete input data.
pub struct AdaptiveExecutor {
    dag: Dag,
    config: ExecutorConfig,
    ctx: ExecutionContext,
    cancel: CancelHandle,
    early_stop: Option<EarlyStop>,
}

impl AdaptiveExecutor {
    /// Creates an executor with default configuration and a fresh context.
    pub fn new(dag: Dag) -> Self {
        AdaptiveExecutor {
            dag,
            config: ExecutorConfig::default(),
            ctx: ExecutionContext::new(),
            cancel: CancelHandle::new(),
            early_stop: None,
        }
    }

    /// Replaces the executor configuration.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the execution context.
    pub fn with_context(mut self, ctx: ExecutionContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Installs an early-stop hook.
    pub fn with_early_stop(mut self, early_stop: EarlyStop) -> Self {
        self.early_stop = Some(early_stop);
        self
    }

    /// Cloneable handle that cancels this execution.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// The executor's context (registries, shared memory).
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Execute the DAG.
    ///
    /// # Errors
    ///
    /// Fails fast with [`RuntimeError::Scheduler`] on invalid
    /// configuration and [`RuntimeError::UnsatisfiedInput`] when a node's
    /// required inputs cannot be satisfied by the initial inputs or any
    /// upstream edge. After a run, fails with [`RuntimeError::Execution`]
    /// if any node failed and `allow_partial` is false. A cancelled run
    /// returns `Ok` with the cancellation marker set.
    pub async fn execute(&self, initial: ValueMap) -> Result<ExecutionResult, RuntimeError> {
        let start = Instant::now();

        self.config
            .validate()
            .map_err(|message| RuntimeError::Scheduler { message })?;

        let initial_fields: HashSet<String> = initial.keys().cloned().collect();
        if let Some((node, field)) = self.dag.missing_inputs(&initial_fields).into_iter().next() {
            return Err(RuntimeError::UnsatisfiedInput { node, field });
        }

        tygent_sched!(info,
            execution_id = %self.ctx.execution_id,
            dag = %self.dag.name(),
            nodes = self.dag.len(),
            max_parallelism = self.config.max_parallelism,
            "Starting DAG execution"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallelism));
        let mut outcomes: HashMap<NodeId, NodeOutcome> = HashMap::new();
        let mut timings: HashMap<NodeId, Duration> = HashMap::new();
        let mut pruned: HashSet<usize> = HashSet::new();
        let mut first_failure: Option<String> = None;
        let mut cancelled = false;
        let mut wave_index = 0usize;

        while outcomes.len() < self.dag.len() {
            self.cascade_skips(&mut outcomes, &pruned);

            if self.cancel.is_cancelled() {
                self.skip_remaining(&mut outcomes, SkipReason::Cancelled);
                cancelled = true;
                break;
            }

            let wave = self.ready_wave(&outcomes, &pruned);
            if wave.is_empty() {
                if outcomes.len() == self.dag.len() {
                    break;
                }
                return Err(RuntimeError::Scheduler {
                    message: format!(
                        "No schedulable wave with {} node(s) remaining in '{}'",
                        self.dag.len() - outcomes.len(),
                        self.dag.name()
                    ),
                });
            }

            tygent_sched!(debug,
                execution_id = %self.ctx.execution_id,
                wave = wave_index,
                nodes = wave.len(),
                "Dispatching wave"
            );

            let settled = self
                .run_wave(&wave, &initial, &outcomes, &pruned, &semaphore)
                .await?;

            let mut completed_this_wave: Vec<NodeId> = Vec::new();
            for output in settled {
                match output {
                    TaskOutput::Single {
                        id,
                        result,
                        duration,
                    } => {
                        timings.insert(id.clone(), duration);
                        self.record_outcome(&id, result, &mut outcomes, &mut first_failure);
                        if outcomes[&id].is_value() {
                            completed_this_wave.push(id);
                        }
                    }
                    TaskOutput::Batch { results, duration } => {
                        for (id, result) in results {
                            timings.insert(id.clone(), duration);
                            self.record_outcome(&id, result, &mut outcomes, &mut first_failure);
                            if outcomes[&id].is_value() {
                                completed_this_wave.push(id);
                            }
                        }
                    }
                    TaskOutput::Cancelled { ids } => {
                        for id in ids {
                            outcomes.insert(
                                id,
                                NodeOutcome::Skipped {
                                    reason: SkipReason::Cancelled,
                                },
                            );
                        }
                    }
                }
            }

            // Wave boundary: staged shared-memory writes become visible.
            self.ctx.memory.commit_wave()?;

            // Evaluate guards on out-edges of nodes that completed in
            // this wave; a false guard prunes the edge.
            for id in &completed_this_wave {
                let outputs = outcomes
                    .get(id)
                    .and_then(NodeOutcome::value)
                    .cloned()
                    .unwrap_or_default();
                for (index, edge) in self.dag.edges().iter().enumerate() {
                    if &edge.from == id
                        && edge.condition.is_guarded()
                        && !edge.condition.is_live(&outputs)
                    {
                        tygent_sched!(debug,
                            from = %edge.from,
                            to = %edge.to,
                            "Guard pruned edge"
                        );
                        pruned.insert(index);
                    }
                }
            }

            if let Some(early_stop) = &self.early_stop {
                if outcomes.len() < self.dag.len() && early_stop.should_stop(&outcomes) {
                    tygent_sched!(info,
                        execution_id = %self.ctx.execution_id,
                        wave = wave_index,
                        "Early-stop criterion met"
                    );
                    self.skip_remaining(&mut outcomes, SkipReason::EarlyStopped);
                    break;
                }
            }

            if self.cancel.is_cancelled() {
                self.skip_remaining(&mut outcomes, SkipReason::Cancelled);
                cancelled = true;
                break;
            }

            wave_index += 1;
        }

        let failed = outcomes.values().filter(|o| o.is_error()).count();
        let result = ExecutionResult {
            results: outcomes,
            timings,
            total: start.elapsed(),
            cancelled,
        };

        tygent_sched!(info,
            execution_id = %self.ctx.execution_id,
            duration_ms = result.total.as_millis() as u64,
            completed = result.completed(),
            failed = failed,
            skipped = result.skipped(),
            cancelled = cancelled,
            "DAG execution finished"
        );

        if failed > 0 && !self.config.allow_partial && !cancelled {
            return Err(RuntimeError::Execution {
                failed,
                first: first_failure.unwrap_or_else(|| "unknown failure".to_string()),
            });
        }

        Ok(result)
    }

    /// Record a node's result, applying its fallback on failure.
    fn record_outcome(
        &self,
        id: &str,
        result: Result<ValueMap, RuntimeError>,
        outcomes: &mut HashMap<NodeId, NodeOutcome>,
        first_failure: &mut Option<String>,
    ) {
        let outcome = match result {
            Ok(outputs) => NodeOutcome::Value(outputs),
            Err(error) => {
                let fallback = self.dag.node(id).and_then(|n| n.fallback.clone());
                match fallback {
                    Some(outputs) => {
                        tygent_node!(info, node = %id, "Using fallback value");
                        NodeOutcome::Value(outputs)
                    }
                    None => {
                        tygent_node!(error, node = %id, error = %error, "Node failed");
                        if first_failure.is_none() {
                            *first_failure = Some(error.to_string());
                        }
                        NodeOutcome::Error {
                            message: error.to_string(),
                        }
                    }
                }
            }
        };
        outcomes.insert(id.to_string(), outcome);
    }

    /// Propagate skips until no pending node's fate is forced.
    fn cascade_skips(
        &self,
        outcomes: &mut HashMap<NodeId, NodeOutcome>,
        pruned: &HashSet<usize>,
    ) {
        loop {
            let mut changed = false;

            for node in self.dag.nodes() {
                if outcomes.contains_key(&node.id) {
                    continue;
                }

                let in_edges: Vec<usize> = self
                    .dag
                    .edges()
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.to == node.id)
                    .map(|(i, _)| i)
                    .collect();
                if in_edges.is_empty() {
                    continue;
                }

                let mut skip: Option<SkipReason> = None;
                let mut live_edges = 0usize;
                for &index in &in_edges {
                    if pruned.contains(&index) {
                        continue;
                    }
                    live_edges += 1;
                    let source = &self.dag.edges()[index].from;
                    match outcomes.get(source) {
                        Some(NodeOutcome::Error { .. }) => {
                            skip = Some(SkipReason::UpstreamFailed {
                                node: source.clone(),
                            });
                            break;
                        }
                        Some(NodeOutcome::Skipped { reason }) => {
                            // Propagate the root cause through the chain.
                            skip = Some(match reason {
                                SkipReason::UpstreamFailed { node } => SkipReason::UpstreamFailed {
                                    node: node.clone(),
                                },
                                other => other.clone(),
                            });
                            break;
                        }
                        _ => {}
                    }
                }

                if skip.is_none() && live_edges == 0 {
                    // Every in-edge was pruned away; the branch is dead.
                    skip = Some(SkipReason::Pruned);
                }

                if let Some(reason) = skip {
                    tygent_sched!(debug, node = %node.id, reason = ?reason, "Node skipped");
                    outcomes.insert(node.id.clone(), NodeOutcome::Skipped { reason });
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }
    }

    /// Pending nodes whose every in-edge is settled: pruned, or source
    /// completed. Insertion order.
    fn ready_wave(
        &self,
        outcomes: &HashMap<NodeId, NodeOutcome>,
        pruned: &HashSet<usize>,
    ) -> Vec<Node> {
        self.dag
            .nodes()
            .iter()
            .filter(|node| !outcomes.contains_key(&node.id))
            .filter(|node| {
                self.dag
                    .edges()
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.to == node.id)
                    .all(|(index, edge)| {
                        pruned.contains(&index)
                            || outcomes
                                .get(&edge.from)
                                .map(NodeOutcome::is_value)
                                .unwrap_or(false)
                    })
            })
            .cloned()
            .collect()
    }

    /// Assemble a node's inputs: the initial inputs form the base layer,
    /// then mapped outputs of completed predecessors merge over it.
    fn assemble_inputs(
        &self,
        node: &Node,
        initial: &ValueMap,
        outcomes: &HashMap<NodeId, NodeOutcome>,
        pruned: &HashSet<usize>,
    ) -> Result<ValueMap, RuntimeError> {
        let mut inputs = initial.clone();

        for (index, edge) in self.dag.edges().iter().enumerate() {
            if edge.to != node.id || pruned.contains(&index) {
                continue;
            }
            let Some(outputs) = outcomes.get(&edge.from).and_then(NodeOutcome::value) else {
                continue;
            };
            for (src_field, dst_field) in &edge.fields {
                if let Some(value) = outputs.get(src_field) {
                    inputs.insert(dst_field.clone(), value.clone());
                }
            }
        }

        for field in &node.required_inputs {
            if !inputs.contains_key(field) {
                return Err(RuntimeError::UnsatisfiedInput {
                    node: node.id.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(inputs)
    }

    /// Launch one wave and wait for every task to settle.
    async fn run_wave(
        &self,
        wave: &[Node],
        initial: &ValueMap,
        outcomes: &HashMap<NodeId, NodeOutcome>,
        pruned: &HashSet<usize>,
        semaphore: &Arc<Semaphore>,
    ) -> Result<Vec<TaskOutput>, RuntimeError> {
        // Partition into batch groups (model nodes sharing a batch key)
        // and singles, preserving insertion order within each bucket.
        // Nodes whose inputs cannot be assembled fail without dispatch.
        let mut unsatisfied: Vec<(NodeId, RuntimeError)> = Vec::new();
        let mut groups: Vec<(String, Vec<(Node, ValueMap)>)> = Vec::new();
        let mut singles: Vec<(Node, ValueMap)> = Vec::new();

        for node in wave {
            let inputs = match self.assemble_inputs(node, initial, outcomes, pruned) {
                Ok(inputs) => inputs,
                Err(error) => {
                    unsatisfied.push((node.id.clone(), error));
                    continue;
                }
            };
            match (&node.kind, &node.batch_key) {
                (NodeKind::Model { .. }, Some(key)) => {
                    match groups.iter_mut().find(|(k, _)| k == key) {
                        Some((_, members)) => members.push((node.clone(), inputs)),
                        None => groups.push((key.clone(), vec![(node.clone(), inputs)])),
                    }
                }
                _ => singles.push((node.clone(), inputs)),
            }
        }

        let mut join_set: JoinSet<TaskOutput> = JoinSet::new();

        for (id, error) in unsatisfied {
            join_set.spawn(async move {
                TaskOutput::Single {
                    id,
                    result: Err(error),
                    duration: Duration::ZERO,
                }
            });
        }

        for (node, inputs) in singles {
            let ctx = self.ctx.clone();
            let config = self.config.clone();
            let cancel = self.cancel.clone();
            let semaphore = Arc::clone(semaphore);

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return TaskOutput::Cancelled {
                        ids: vec![node.id.clone()],
                    };
                };
                let started = Instant::now();
                tokio::select! {
                    result = run_with_retries(&ctx, &config, &node, &inputs) => TaskOutput::Single {
                        id: node.id.clone(),
                        result,
                        duration: started.elapsed(),
                    },
                    _ = cancel.cancelled() => TaskOutput::Cancelled {
                        ids: vec![node.id.clone()],
                    },
                }
            });
        }

        for (key, members) in groups {
            let ctx = self.ctx.clone();
            let cancel = self.cancel.clone();
            let semaphore = Arc::clone(semaphore);

            join_set.spawn(async move {
                let ids: Vec<NodeId> = members.iter().map(|(n, _)| n.id.clone()).collect();
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return TaskOutput::Cancelled { ids };
                };
                let started = Instant::now();
                tygent_sched!(debug, batch = %key, nodes = ids.len(), "Dispatching batch group");
                tokio::select! {
                    result = handlers::model::execute_batch(&ctx, &members) => {
                        let duration = started.elapsed();
                        let results = match result {
                            Ok(outputs) => ids.into_iter().zip(outputs.into_iter().map(Ok)).collect(),
                            Err(error) => {
                                let message = error.to_string();
                                ids.into_iter()
                                    .map(|id| {
                                        let failure = RuntimeError::Node {
                                            node: id.clone(),
                                            message: message.clone(),
                                        };
                                        (id, Err(failure))
                                    })
                                    .collect()
                            }
                        };
                        TaskOutput::Batch { results, duration }
                    },
                    _ = cancel.cancelled() => TaskOutput::Cancelled { ids },
                }
            });
        }

        let mut settled = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(output) => settled.push(output),
                Err(error) => {
                    return Err(RuntimeError::Scheduler {
                        message: format!("Node task aborted: {}", error),
                    });
                }
            }
        }
        Ok(settled)
    }

    /// Mark every pending node skipped with the given reason.
    fn skip_remaining(&self, outcomes: &mut HashMap<NodeId, NodeOutcome>, reason: SkipReason) {
        for node in self.dag.nodes() {
            if !outcomes.contains_key(&node.id) {
                outcomes.insert(
                    node.id.clone(),
                    NodeOutcome::Skipped {
                        reason: reason.clone(),
                    },
                );
            }
        }
    }
}

/// Execute a node with retry, backoff, and the optional per-node timeout.
async fn run_with_retries(
    ctx: &ExecutionContext,
    config: &ExecutorConfig,
    node: &Node,
    inputs: &ValueMap,
) -> Result<ValueMap, RuntimeError> {
    let mut attempt = 0u32;

    loop {
        tygent_node!(trace, node = %node.id, attempt = attempt + 1, "Executing node");

        let work = NodeDispatcher::dispatch(ctx, node, inputs.clone());
        let result = if config.node_timeout_ms > 0 {
            let timeout = Duration::from_millis(config.node_timeout_ms);
            match tokio::time::timeout(timeout, work).await {
                Ok(result) => result,
                Err(_) => Err(RuntimeError::Timeout {
                    node: node.id.clone(),
                    timeout,
                }),
            }
        } else {
            work.await
        };

        match result {
            Ok(outputs) => return Ok(outputs),
            Err(error) => {
                attempt += 1;
                if attempt > config.max_retries {
                    return Err(error);
                }
                let backoff_ms = calculate_backoff(config, attempt);
                tygent_node!(debug,
                    node = %node.id,
                    attempt = attempt,
                    backoff_ms = backoff_ms,
                    error = %error,
                    "Retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Calculate exponential backoff delay in milliseconds.
#[inline]
fn calculate_backoff(config: &ExecutorConfig, attempt: u32) -> u64 {
    let pow = (attempt - 1).min(31); // Prevent overflow
    config
        .retry_backoff_ms
        .saturating_mul(2u64.saturating_pow(pow))
        .min(config.retry_backoff_max_ms)
}
