//! Runtime errors.
//!
//! These errors occur while executing a DAG: node failures, unsatisfied
//! inputs, timeouts, and the top-level all-or-nothing escalation.

use std::time::Duration;

use thiserror::Error;

use crate::error::GraphError;

/// Errors that occur during DAG execution.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A node's executable unit failed. Recorded in the failing node's
    /// result slot; sibling branches keep running.
    #[error("Node '{node}' failed: {message}")]
    Node {
        /// Id of the failing node.
        node: String,
        /// Underlying failure description.
        message: String,
    },

    /// A node's required input field could not be assembled from initial
    /// inputs or upstream outputs.
    #[error("Node '{node}' is missing required input '{field}'")]
    UnsatisfiedInput {
        /// Node whose inputs were incomplete.
        node: String,
        /// Required field that was absent.
        field: String,
    },

    /// Tool invocation error.
    #[error("Tool error: {tool} - {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Error message describing the tool failure.
        message: String,
    },

    /// Model backend error.
    #[error(
        "Model error{backend}: {message}",
        backend = Self::backend_suffix(.backend)
    )]
    Model {
        /// Error message describing the model failure.
        message: String,
        /// Optional backend identifier.
        backend: Option<String>,
    },

    /// Shared memory error.
    #[error("Memory error: {message}")]
    Memory {
        /// Error message describing the memory failure.
        message: String,
    },

    /// A node exceeded its execution timeout.
    #[error("Timeout: node '{node}' exceeded {timeout:?}")]
    Timeout {
        /// Node that timed out.
        node: String,
        /// Time budget that was exceeded.
        timeout: Duration,
    },

    /// Execution was cancelled by the caller or a deadline.
    #[error("Execution cancelled")]
    Cancelled,

    /// Scheduler error. Guards against graph states that should be
    /// impossible after construction-time cycle rejection.
    #[error("Scheduler error: {message}")]
    Scheduler {
        /// Error message describing the scheduler failure.
        message: String,
    },

    /// Top-level failure raised when the caller requires all-or-nothing
    /// semantics and at least one node failed.
    #[error("Execution failed: {failed} node(s) failed, first: {first}")]
    Execution {
        /// Number of failed nodes.
        failed: usize,
        /// Description of the first failure.
        first: String,
    },

    /// Graph construction error surfaced during orchestration.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl RuntimeError {
    fn backend_suffix(backend: &Option<String>) -> String {
        match backend {
            Some(b) => format!(" (backend: {})", b),
            None => String::new(),
        }
    }
}
