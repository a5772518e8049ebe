//! Tygent Core - Data model and seams for the Tygent DAG engine.
//!
//! This crate provides the typed graph (nodes, edges, DAG), the value and
//! result types, the error hierarchy, and the tool/model traits the
//! runtime dispatches through.

pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::{GraphError, RuntimeError};

pub use traits::{FnTool, ModelBackend, ModelRequest, ModelResponse, ToolExecutor};

pub use types::{
    Dag, Edge, EdgeCondition, ExecutionResult, FieldMap, MemoryOp, Node, NodeId, NodeKind,
    NodeMetadata, NodeOutcome, Number, SkipReason, Value, ValueMap,
};
