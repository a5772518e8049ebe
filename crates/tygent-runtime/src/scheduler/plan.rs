//! Wave planner.
//!
//! Transforms a DAG into concurrent waves: repeatedly collect every node
//! whose unresolved-dependency count is zero, emit them as one wave, then
//! decrement the dependency counts of their successors. Construction-time
//! cycle rejection makes the failure path unreachable, but it is guarded
//! defensively.

use std::collections::HashMap;

use tygent_core::error::RuntimeError;
use tygent_core::types::{Dag, NodeId};
use tygent_core::tygent_sched;

/// Dependency-ordered groups of nodes that can run concurrently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Waves in dependency order; nodes within a wave are ordered by
    /// insertion order.
    pub waves: Vec<Vec<NodeId>>,
}

impl ExecutionPlan {
    /// Total number of planned nodes.
    pub fn node_count(&self) -> usize {
        self.waves.iter().map(Vec::len).sum()
    }

    /// Index of the wave containing a node.
    pub fn wave_of(&self, node: &str) -> Option<usize> {
        self.waves
            .iter()
            .position(|wave| wave.iter().any(|id| id == node))
    }
}

/// Build the wave plan for a DAG.
///
/// # Errors
///
/// Returns [`RuntimeError::Scheduler`] if nodes remain but no wave can be
/// formed, which would mean a cycle slipped past construction.
pub fn build_waves(dag: &Dag) -> Result<ExecutionPlan, RuntimeError> {
    let mut in_degree: HashMap<&str, usize> =
        dag.nodes().iter().map(|n| (n.id.as_str(), 0)).collect();
    for edge in dag.edges() {
        if let Some(d) = in_degree.get_mut(edge.to.as_str()) {
            *d += 1;
        }
    }

    let mut waves = Vec::new();
    let mut remaining = dag.len();

    while remaining > 0 {
        // Insertion order within the wave falls out of iterating `nodes()`.
        let wave: Vec<NodeId> = dag
            .nodes()
            .iter()
            .filter(|n| in_degree.get(n.id.as_str()) == Some(&0))
            .map(|n| n.id.clone())
            .collect();

        if wave.is_empty() {
            return Err(RuntimeError::Scheduler {
                message: format!(
                    "No schedulable wave with {} node(s) remaining in '{}'",
                    remaining,
                    dag.name()
                ),
            });
        }

        for id in &wave {
            in_degree.remove(id.as_str());
            for edge in dag.edges().iter().filter(|e| &e.from == id) {
                if let Some(d) = in_degree.get_mut(edge.to.as_str()) {
                    *d -= 1;
                }
            }
        }

        remaining -= wave.len();
        waves.push(wave);
    }

    tygent_sched!(debug,
        dag = %dag.name(),
        waves = waves.len(),
        nodes = dag.len(),
        "Wave plan built"
    );

    Ok(ExecutionPlan { waves })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tygent_core::types::{Edge, FieldMap, Node};

    fn dag_of(nodes: &[&str], edges: &[(&str, &str)]) -> Dag {
        let mut dag = Dag::new("test");
        for id in nodes {
            dag.add_node(Node::tool(*id, "noop")).expect("node");
        }
        for (from, to) in edges {
            dag.add_edge(Edge::new(*from, *to, FieldMap::new()))
                .expect("edge");
        }
        dag
    }

    #[test]
    fn test_independent_roots_share_wave_zero() {
        let dag = dag_of(&["a", "b", "c", "d"], &[]);
        let plan = build_waves(&dag).expect("plan");
        assert_eq!(plan.waves, vec![vec!["a", "b", "c", "d"]]);
    }

    #[test]
    fn test_diamond_waves() {
        let dag = dag_of(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let plan = build_waves(&dag).expect("plan");
        assert_eq!(
            plan.waves,
            vec![vec!["a"], vec!["b", "c"], vec!["d"]]
        );
        assert_eq!(plan.wave_of("c"), Some(1));
        assert_eq!(plan.node_count(), 4);
    }

    #[test]
    fn test_disjoint_chains_interleave() {
        let dag = dag_of(&["a", "x", "b"], &[("a", "b")]);
        let plan = build_waves(&dag).expect("plan");
        assert_eq!(plan.waves, vec![vec!["a", "x"], vec!["b"]]);
    }

    #[test]
    fn test_empty_dag_plans_no_waves() {
        let dag = Dag::new("empty");
        let plan = build_waves(&dag).expect("plan");
        assert!(plan.waves.is_empty());
    }
}
