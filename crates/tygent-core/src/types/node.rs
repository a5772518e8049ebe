//! DAG node representation.
//!
//! A node is a unit of work — a tool call, a model call, or a shared
//! memory operation — with declared input and output fields. The declared
//! fields are what edge field maps are validated against.

use serde::{Deserialize, Serialize};

use crate::types::ValueMap;

/// Type alias for node identifiers. Unique within a DAG; insertion order
/// is the tie-break everywhere ordering matters.
pub type NodeId = String;

/// Shared memory operation carried by a memory node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryOp {
    /// Read one key from the committed store; outputs `value`.
    Read {
        /// Key to read.
        key: String,
    },
    /// Stage a write of the node's `value` input under a fixed key.
    Write {
        /// Key to write.
        key: String,
    },
    /// Capture the full committed store; outputs `memory`.
    Snapshot,
}

/// The kind of work a node performs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Invoke a registered tool by name.
    Tool {
        /// Registry name of the tool.
        tool: String,
    },
    /// Call a model backend with a rendered prompt template.
    Model {
        /// Model name, resolved through the model registry.
        model: String,
        /// Optional system prompt.
        system_prompt: Option<String>,
        /// Prompt template, rendered against the node's assembled inputs.
        prompt: String,
    },
    /// Operate on the execution's shared memory store.
    Memory {
        /// Operation to perform.
        op: MemoryOp,
    },
}

/// Metadata used for scheduling diagnostics.
///
/// Fields at their defaults are omitted from serialization so the JSON
/// stays compact; missing fields deserialize to their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Estimated execution latency in milliseconds. Feeds critical-path
    /// analysis; nodes without an estimate count as 1 ms there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_latency_ms: Option<u64>,
}

/// Returns `true` when a `Vec` is empty (used by `skip_serializing_if`).
fn is_empty_vec<T>(v: &[T]) -> bool {
    v.is_empty()
}

/// Returns `true` when `NodeMetadata` equals its `Default`.
fn is_default_metadata(m: &NodeMetadata) -> bool {
    *m == NodeMetadata::default()
}

/// A unit of work in the DAG.
///
/// Owned exclusively by the DAG that contains it. The declared
/// `required_inputs`/`optional_inputs` and `outputs` are the contract edge
/// field maps are checked against at construction time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier, stable across the DAG.
    pub id: NodeId,
    /// What the node does when dispatched.
    pub kind: NodeKind,
    /// Input fields that must be present when the node runs.
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub required_inputs: Vec<String>,
    /// Input fields the node understands but can run without.
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub optional_inputs: Vec<String>,
    /// Output fields the node produces on success.
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub outputs: Vec<String>,
    /// Scheduling metadata.
    #[serde(default, skip_serializing_if = "is_default_metadata")]
    pub metadata: NodeMetadata,
    /// Output used in place of a failure; a node with a fallback counts
    /// as completed and its dependents still run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<ValueMap>,
    /// Same-wave model nodes sharing a batch key are dispatched as one
    /// batched backend call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_key: Option<String>,
    /// When set on a model node, the response is staged into shared
    /// memory under this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_key: Option<String>,
}

impl Node {
    /// Creates a tool node.
    pub fn tool(id: impl Into<NodeId>, tool: impl Into<String>) -> Self {
        Node::new(
            id,
            NodeKind::Tool {
                tool: tool.into(),
            },
        )
    }

    /// Creates a model-call node.
    pub fn model(
        id: impl Into<NodeId>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Node::new(
            id,
            NodeKind::Model {
                model: model.into(),
                system_prompt: None,
                prompt: prompt.into(),
            },
        )
    }

    /// Creates a memory node.
    pub fn memory(id: impl Into<NodeId>, op: MemoryOp) -> Self {
        Node::new(id, NodeKind::Memory { op })
    }

    fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Node {
            id: id.into(),
            kind,
            required_inputs: Vec::new(),
            optional_inputs: Vec::new(),
            outputs: Vec::new(),
            metadata: NodeMetadata::default(),
            fallback: None,
            batch_key: None,
            memory_key: None,
        }
    }

    /// Sets the system prompt on a model node; no-op for other kinds.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        if let NodeKind::Model {
            system_prompt: slot,
            ..
        } = &mut self.kind
        {
            *slot = Some(system_prompt.into());
        }
        self
    }

    /// Declares the required input fields.
    pub fn with_required_inputs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_inputs = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the optional input fields.
    pub fn with_optional_inputs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_inputs = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the output fields.
    pub fn with_outputs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the estimated latency used by critical-path analysis.
    pub fn with_estimated_latency_ms(mut self, ms: u64) -> Self {
        self.metadata.estimated_latency_ms = Some(ms);
        self
    }

    /// Sets a fallback output used when the node fails.
    pub fn with_fallback(mut self, fallback: ValueMap) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Assigns the node to a batch dispatch group.
    pub fn with_batch_key(mut self, key: impl Into<String>) -> Self {
        self.batch_key = Some(key.into());
        self
    }

    /// Stages the node's response into shared memory under `key`.
    pub fn with_memory_key(mut self, key: impl Into<String>) -> Self {
        self.memory_key = Some(key.into());
        self
    }

    /// True if the node declares `field` as a required or optional input.
    pub fn declares_input(&self, field: &str) -> bool {
        self.required_inputs.iter().any(|f| f == field)
            || self.optional_inputs.iter().any(|f| f == field)
    }

    /// True if the node declares `field` as an output.
    pub fn declares_output(&self, field: &str) -> bool {
        self.outputs.iter().any(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialization_with_missing_fields() {
        // Minimal JSON with only required fields should deserialize,
        // filling in defaults for omitted optional fields.
        let json = r#"{"id":"search","kind":{"Tool":{"tool":"web_search"}}}"#;
        let node: Node = serde_json::from_str(json).expect("deserialize minimal node");

        assert_eq!(node.id, "search");
        assert!(node.required_inputs.is_empty());
        assert!(node.outputs.is_empty());
        assert_eq!(node.metadata, NodeMetadata::default());
        assert!(node.fallback.is_none());
    }

    #[test]
    fn test_builder_declarations() {
        let node = Node::model("process", "gpt-4o", "Analyze: {{ results }}")
            .with_system_prompt("You are an analyst.")
            .with_required_inputs(["results"])
            .with_optional_inputs(["context"])
            .with_outputs(["response"])
            .with_estimated_latency_ms(1200);

        assert!(node.declares_input("results"));
        assert!(node.declares_input("context"));
        assert!(!node.declares_input("missing"));
        assert!(node.declares_output("response"));
        assert_eq!(node.metadata.estimated_latency_ms, Some(1200));
    }

    #[test]
    fn test_roundtrip_with_all_fields() {
        let mut fallback = ValueMap::new();
        fallback.insert("response".to_string(), crate::types::Value::from("n/a"));

        let node = Node::model("agent_critic", "gpt-4o", "{{ query }}")
            .with_outputs(["response"])
            .with_fallback(fallback)
            .with_batch_key("round_1")
            .with_memory_key("critic");

        let json = serde_json::to_string(&node).expect("serialize");
        let restored: Node = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(node, restored);
    }
}
