//! Graph construction errors.

use thiserror::Error;

/// Errors raised while building a DAG.
///
/// All variants are fatal to the offending call and leave the graph
/// unchanged.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node with the same id already exists in the DAG.
    #[error("Node '{id}' already exists")]
    DuplicateNode {
        /// Id of the node that was added twice.
        id: String,
    },

    /// An edge endpoint references a node the DAG does not contain.
    #[error("Node '{id}' does not exist")]
    UnknownNode {
        /// Id of the missing node.
        id: String,
    },

    /// Adding the edge would close a cycle.
    #[error("Edge {from} -> {to} would create a cycle")]
    Cycle {
        /// Source node of the rejected edge.
        from: String,
        /// Destination node of the rejected edge.
        to: String,
    },

    /// An edge field map references a field the endpoint does not declare.
    #[error("Node '{node}' does not declare field '{field}'")]
    UnknownField {
        /// Node whose declaration was consulted.
        node: String,
        /// Field name missing from the declaration.
        field: String,
    },
}
