//! Tool node handler.

use tygent_core::error::RuntimeError;
use tygent_core::tygent_node;
use tygent_core::types::{Node, NodeKind, ValueMap};

use crate::executor::ExecutionContext;

/// Resolve the node's tool and invoke it with the assembled inputs.
pub async fn execute(
    ctx: &ExecutionContext,
    node: &Node,
    inputs: ValueMap,
) -> Result<ValueMap, RuntimeError> {
    let NodeKind::Tool { tool } = &node.kind else {
        return Err(RuntimeError::Node {
            node: node.id.clone(),
            message: "Dispatched to tool handler without a tool kind".to_string(),
        });
    };

    let executor = ctx.tools.get(tool)?;

    tygent_node!(debug,
        node = %node.id,
        tool = %tool,
        inputs = inputs.len(),
        "Invoking tool"
    );

    executor.invoke(inputs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tygent_core::traits::FnTool;
    use tygent_core::types::Value;

    #[tokio::test]
    async fn test_tool_execution() {
        let ctx = ExecutionContext::new();
        ctx.tools
            .register(Arc::new(FnTool::new("double", |inputs: ValueMap| async move {
                let n = inputs.get("n").and_then(Value::as_f64).unwrap_or(0.0);
                Ok(ValueMap::from([("n".to_string(), Value::from(n * 2.0))]))
            })))
            .expect("register");

        let node = Node::tool("calc", "double")
            .with_required_inputs(["n"])
            .with_outputs(["n"]);
        let inputs = ValueMap::from([("n".to_string(), Value::from(21.0))]);

        let outputs = execute(&ctx, &node, inputs).await.expect("execute");
        assert_eq!(outputs.get("n"), Some(&Value::from(42.0)));
    }

    #[tokio::test]
    async fn test_unregistered_tool_fails() {
        let ctx = ExecutionContext::new();
        let node = Node::tool("calc", "missing");

        let err = execute(&ctx, &node, ValueMap::new()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Tool { .. }));
    }
}
