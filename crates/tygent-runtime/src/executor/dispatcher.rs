//! Node dispatcher - Routes nodes to the handler for their kind.

use tygent_core::error::RuntimeError;
use tygent_core::tygent_node;
use tygent_core::types::{Node, NodeKind, ValueMap};

use super::handlers;
use super::ExecutionContext;

/// Routes a node to its handler.
pub struct NodeDispatcher;

impl NodeDispatcher {
    /// Dispatch a node with its assembled inputs.
    ///
    /// # Errors
    ///
    /// Propagates the handler's failure; the executor records it in the
    /// node's result slot.
    pub async fn dispatch(
        ctx: &ExecutionContext,
        node: &Node,
        inputs: ValueMap,
    ) -> Result<ValueMap, RuntimeError> {
        tygent_node!(trace,
            node = %node.id,
            kind = ?node.kind,
            inputs = inputs.len(),
            "Handler dispatch"
        );

        match &node.kind {
            NodeKind::Tool { .. } => handlers::tool::execute(ctx, node, inputs).await,
            NodeKind::Model { .. } => handlers::model::execute(ctx, node, inputs).await,
            NodeKind::Memory { .. } => handlers::memory::execute(ctx, node, inputs).await,
        }
    }
}
