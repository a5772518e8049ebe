//! Memory node handler.

use tygent_core::error::RuntimeError;
use tygent_core::tygent_mem;
use tygent_core::types::{MemoryOp, Node, NodeKind, Value, ValueMap};

use crate::executor::ExecutionContext;

/// Execute a memory node against the shared store.
///
/// - `Read { key }` outputs the committed value under `value` (null when
///   absent).
/// - `Write { key }` stages the node's `value` input; the write becomes
///   visible at the next wave boundary. Outputs echo the written value.
/// - `Snapshot` outputs the full committed store under `memory`.
pub async fn execute(
    ctx: &ExecutionContext,
    node: &Node,
    inputs: ValueMap,
) -> Result<ValueMap, RuntimeError> {
    let NodeKind::Memory { op } = &node.kind else {
        return Err(RuntimeError::Node {
            node: node.id.clone(),
            message: "Dispatched to memory handler without a memory kind".to_string(),
        });
    };

    let mut outputs = ValueMap::new();
    match op {
        MemoryOp::Read { key } => {
            let value = ctx.memory.get(key).unwrap_or(Value::Null);
            tygent_mem!(debug, node = %node.id, key = %key, "Memory read");
            outputs.insert("value".to_string(), value);
        }
        MemoryOp::Write { key } => {
            let value = inputs
                .get("value")
                .cloned()
                .ok_or_else(|| RuntimeError::Memory {
                    message: format!("Write node '{}' received no 'value' input", node.id),
                })?;
            ctx.memory.stage(key.clone(), value.clone());
            outputs.insert("value".to_string(), value);
        }
        MemoryOp::Snapshot => {
            let snapshot = ctx.memory.snapshot();
            tygent_mem!(debug, node = %node.id, keys = snapshot.len(), "Memory snapshot");
            outputs.insert("memory".to_string(), Value::Object(snapshot));
        }
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_write_snapshot_cycle() {
        let ctx = ExecutionContext::new();

        let write = Node::memory(
            "store",
            MemoryOp::Write {
                key: "finding".to_string(),
            },
        )
        .with_required_inputs(["value"])
        .with_outputs(["value"]);

        let inputs = ValueMap::from([("value".to_string(), Value::from("staged"))]);
        execute(&ctx, &write, inputs).await.expect("write");

        // Before the wave commit, a reader sees null.
        let read = Node::memory(
            "load",
            MemoryOp::Read {
                key: "finding".to_string(),
            },
        )
        .with_outputs(["value"]);
        let outputs = execute(&ctx, &read, ValueMap::new()).await.expect("read");
        assert_eq!(outputs.get("value"), Some(&Value::Null));

        ctx.memory.commit_wave().expect("commit");
        let outputs = execute(&ctx, &read, ValueMap::new()).await.expect("read");
        assert_eq!(outputs.get("value"), Some(&Value::from("staged")));

        let snap = Node::memory("snap", MemoryOp::Snapshot).with_outputs(["memory"]);
        let outputs = execute(&ctx, &snap, ValueMap::new()).await.expect("snapshot");
        let memory = outputs.get("memory").and_then(Value::as_object).expect("object");
        assert_eq!(memory.get("finding"), Some(&Value::from("staged")));
    }

    #[tokio::test]
    async fn test_write_without_value_fails() {
        let ctx = ExecutionContext::new();
        let write = Node::memory(
            "store",
            MemoryOp::Write {
                key: "k".to_string(),
            },
        );

        let err = execute(&ctx, &write, ValueMap::new()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Memory { .. }));
    }
}
