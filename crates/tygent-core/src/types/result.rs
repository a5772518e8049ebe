//! Execution results.
//!
//! One [`ExecutionResult`] is created per executor invocation and is
//! immutable once returned. Every node that entered scheduling gets an
//! outcome slot; nodes that actually ran also get a wall-clock duration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, ValueMap};

/// Why a node was skipped instead of executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// A transitive upstream dependency failed.
    UpstreamFailed {
        /// The failed upstream node.
        node: NodeId,
    },
    /// Every in-edge of the node was pruned by a false guard.
    Pruned,
    /// The early-stop criterion was met before the node's wave.
    EarlyStopped,
    /// Execution was cancelled before the node's wave.
    Cancelled,
}

/// Per-node result slot: a value, an error marker, or a skip marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeOutcome {
    /// The node completed and produced these outputs.
    Value(ValueMap),
    /// The node ran and failed.
    Error {
        /// Failure description from the underlying tool/model/memory call.
        message: String,
    },
    /// The node never ran.
    Skipped {
        /// Why it was skipped.
        reason: SkipReason,
    },
}

impl NodeOutcome {
    /// Output map of a completed node.
    pub fn value(&self) -> Option<&ValueMap> {
        match self {
            NodeOutcome::Value(map) => Some(map),
            _ => None,
        }
    }

    /// True for completed nodes.
    pub fn is_value(&self) -> bool {
        matches!(self, NodeOutcome::Value(_))
    }

    /// True for failed nodes.
    pub fn is_error(&self) -> bool {
        matches!(self, NodeOutcome::Error { .. })
    }

    /// True for skipped nodes.
    pub fn is_skipped(&self) -> bool {
        matches!(self, NodeOutcome::Skipped { .. })
    }
}

/// Result of one executor invocation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome per node id.
    pub results: HashMap<NodeId, NodeOutcome>,
    /// Wall-clock duration per node, dispatch to settle. Skipped nodes
    /// have no entry.
    pub timings: HashMap<NodeId, Duration>,
    /// Wall-clock duration of the whole run.
    pub total: Duration,
    /// True when execution was cancelled; collected results remain valid.
    pub cancelled: bool,
}

impl ExecutionResult {
    /// Number of completed nodes.
    pub fn completed(&self) -> usize {
        self.results.values().filter(|o| o.is_value()).count()
    }

    /// Number of failed nodes.
    pub fn failed(&self) -> usize {
        self.results.values().filter(|o| o.is_error()).count()
    }

    /// Number of skipped nodes.
    pub fn skipped(&self) -> usize {
        self.results.values().filter(|o| o.is_skipped()).count()
    }

    /// Output map of a completed node, if present.
    pub fn output(&self, node: &str) -> Option<&ValueMap> {
        self.results.get(node).and_then(NodeOutcome::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_counters() {
        let mut result = ExecutionResult::default();
        result.results.insert(
            "a".to_string(),
            NodeOutcome::Value(ValueMap::from([(
                "out".to_string(),
                Value::from("done"),
            )])),
        );
        result.results.insert(
            "b".to_string(),
            NodeOutcome::Error {
                message: "boom".to_string(),
            },
        );
        result.results.insert(
            "c".to_string(),
            NodeOutcome::Skipped {
                reason: SkipReason::UpstreamFailed {
                    node: "b".to_string(),
                },
            },
        );

        assert_eq!(result.completed(), 1);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.skipped(), 1);
        assert_eq!(
            result.output("a").and_then(|m| m.get("out")),
            Some(&Value::from("done"))
        );
        assert!(result.output("b").is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut result = ExecutionResult::default();
        result
            .results
            .insert("x".to_string(), NodeOutcome::Value(ValueMap::new()));
        result
            .timings
            .insert("x".to_string(), Duration::from_millis(42));
        result.total = Duration::from_millis(50);

        let json = serde_json::to_string(&result).expect("serialize");
        let restored: ExecutionResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.timings["x"], Duration::from_millis(42));
        assert!(!restored.cancelled);
    }
}
