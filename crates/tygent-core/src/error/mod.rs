//! Error hierarchy for the Tygent engine.
//!
//! Construction-time failures ([`GraphError`]) surface immediately from
//! `add_node`/`add_edge` and are non-retryable. Execution-time failures
//! ([`RuntimeError`]) are captured per node and only escalate when the
//! caller opted out of partial-result tolerance.

mod graph;
mod runtime;

pub use graph::GraphError;
pub use runtime::RuntimeError;
