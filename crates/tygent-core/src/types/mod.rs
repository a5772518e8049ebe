//! Core data model: values, nodes, edges, the DAG, and results.

mod dag;
mod edge;
mod node;
mod result;
mod value;

pub use dag::Dag;
pub use edge::{Edge, EdgeCondition, FieldMap};
pub use node::{MemoryOp, Node, NodeId, NodeKind, NodeMetadata};
pub use result::{ExecutionResult, NodeOutcome, SkipReason};
pub use value::{Number, Value, ValueMap};
