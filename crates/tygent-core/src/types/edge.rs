//! DAG edge representation.
//!
//! Edges are directed data-flow dependencies. The field map routes named
//! output fields of the source into named input fields of the destination;
//! an empty map is an ordering-only dependency. A guarded edge carries a
//! predicate over the source node's outputs, evaluated once at the wave
//! transition after the source settles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{NodeId, ValueMap};

/// Mapping from source output field to destination input field.
pub type FieldMap = HashMap<String, String>;

/// Predicate deciding whether a guarded edge stays live.
type GuardFn = dyn Fn(&ValueMap) -> bool + Send + Sync;

/// Condition attached to an edge.
#[derive(Clone)]
pub enum EdgeCondition {
    /// The edge is always live.
    Unconditional,
    /// The edge is live only if the predicate holds on the source
    /// node's outputs.
    Guarded(Arc<GuardFn>),
}

impl EdgeCondition {
    /// Builds a guarded condition from a predicate.
    pub fn guarded<F>(predicate: F) -> Self
    where
        F: Fn(&ValueMap) -> bool + Send + Sync + 'static,
    {
        EdgeCondition::Guarded(Arc::new(predicate))
    }

    /// Evaluates the condition against the source node's outputs.
    pub fn is_live(&self, source_outputs: &ValueMap) -> bool {
        match self {
            EdgeCondition::Unconditional => true,
            EdgeCondition::Guarded(predicate) => predicate(source_outputs),
        }
    }

    /// True for guarded conditions.
    pub fn is_guarded(&self) -> bool {
        matches!(self, EdgeCondition::Guarded(_))
    }
}

impl fmt::Debug for EdgeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeCondition::Unconditional => write!(f, "Unconditional"),
            EdgeCondition::Guarded(_) => write!(f, "Guarded(..)"),
        }
    }
}

/// A directed data-flow dependency between two nodes.
#[derive(Clone, Debug)]
pub struct Edge {
    /// Source node id (where the fields are produced).
    pub from: NodeId,
    /// Destination node id (where the fields are consumed).
    pub to: NodeId,
    /// Field routing; empty means ordering only.
    pub fields: FieldMap,
    /// Liveness condition.
    pub condition: EdgeCondition,
}

impl Edge {
    /// Creates an unconditional edge.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, fields: FieldMap) -> Self {
        Edge {
            from: from.into(),
            to: to.into(),
            fields,
            condition: EdgeCondition::Unconditional,
        }
    }

    /// Attaches a guard predicate to the edge.
    pub fn with_guard<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ValueMap) -> bool + Send + Sync + 'static,
    {
        self.condition = EdgeCondition::guarded(predicate);
        self
    }

    /// True if the edge carries no fields and only orders execution.
    pub fn is_ordering_only(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_unconditional_edge_is_always_live() {
        let edge = Edge::new("a", "b", FieldMap::new());
        assert!(edge.condition.is_live(&ValueMap::new()));
        assert!(!edge.condition.is_guarded());
        assert!(edge.is_ordering_only());
    }

    #[test]
    fn test_guarded_edge_follows_predicate() {
        let edge = Edge::new("analyze", "escalate", FieldMap::new()).with_guard(|outputs| {
            outputs
                .get("confidence")
                .and_then(Value::as_f64)
                .map(|c| c < 0.5)
                .unwrap_or(false)
        });

        let mut low = ValueMap::new();
        low.insert("confidence".to_string(), Value::from(0.3));
        assert!(edge.condition.is_live(&low));

        let mut high = ValueMap::new();
        high.insert("confidence".to_string(), Value::from(0.9));
        assert!(!edge.condition.is_live(&high));
        assert!(edge.condition.is_guarded());
    }
}
