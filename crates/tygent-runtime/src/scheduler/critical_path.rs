//! Critical-path analysis.
//!
//! Finds the longest dependency chain through a DAG by cumulative
//! estimated latency. Diagnostic only: the wave plan does not depend on
//! it.

use std::collections::HashMap;

use tygent_core::types::{Dag, NodeId};

/// Latency assumed for nodes without an estimate, in milliseconds.
const DEFAULT_LATENCY_MS: u64 = 1;

/// Returns the ordered node ids forming the longest dependency chain by
/// cumulative estimated latency. Ties are broken by insertion order.
///
/// Returns an empty path for an empty DAG.
pub fn find_critical_path(dag: &Dag) -> Vec<NodeId> {
    if dag.is_empty() {
        return Vec::new();
    }

    let cost = |id: &str| -> u64 {
        dag.node(id)
            .and_then(|n| n.metadata.estimated_latency_ms)
            .unwrap_or(DEFAULT_LATENCY_MS)
    };

    // Cumulative latency up to and including each node, plus the
    // predecessor that realizes it.
    let mut total: HashMap<NodeId, u64> = HashMap::new();
    let mut best_pred: HashMap<NodeId, NodeId> = HashMap::new();

    for id in dag.topological_order() {
        let mut best: Option<(u64, &NodeId)> = None;
        for pred in dag.predecessors(&id) {
            let pred_total = total[pred.as_str()];
            let better = match best {
                None => true,
                Some((t, current)) => {
                    pred_total > t
                        || (pred_total == t
                            && dag.insertion_index(pred) < dag.insertion_index(current))
                }
            };
            if better {
                best = Some((pred_total, pred));
            }
        }

        let upstream = best.map(|(t, _)| t).unwrap_or(0);
        total.insert(id.clone(), upstream + cost(&id));
        if let Some((_, pred)) = best {
            best_pred.insert(id.clone(), pred.clone());
        }
    }

    // Chain end: maximum cumulative latency, earliest insertion on ties.
    let Some(end) = dag.nodes().iter().map(|n| &n.id).max_by(|a, b| {
        total[a.as_str()].cmp(&total[b.as_str()]).then(
            // Reversed: smaller insertion index wins the tie.
            dag.insertion_index(b).cmp(&dag.insertion_index(a)),
        )
    }) else {
        return Vec::new();
    };

    let mut path = vec![end.clone()];
    let mut current = end;
    while let Some(pred) = best_pred.get(current) {
        path.push(pred.clone());
        current = pred;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tygent_core::types::{Edge, FieldMap, Node};

    fn node(id: &str, latency_ms: u64) -> Node {
        Node::tool(id, "noop").with_estimated_latency_ms(latency_ms)
    }

    #[test]
    fn test_linear_chain_beats_disjoint_node() {
        let mut dag = Dag::new("test");
        dag.add_node(node("a", 1_000)).expect("node");
        dag.add_node(node("b", 2_000)).expect("node");
        dag.add_node(node("c", 1_000)).expect("node");
        dag.add_node(node("x", 500)).expect("node");
        dag.add_edge(Edge::new("a", "b", FieldMap::new())).expect("edge");
        dag.add_edge(Edge::new("b", "c", FieldMap::new())).expect("edge");

        assert_eq!(find_critical_path(&dag), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_slower_branch_wins() {
        let mut dag = Dag::new("test");
        dag.add_node(node("root", 100)).expect("node");
        dag.add_node(node("fast", 100)).expect("node");
        dag.add_node(node("slow", 900)).expect("node");
        dag.add_node(node("join", 100)).expect("node");
        for (from, to) in [("root", "fast"), ("root", "slow"), ("fast", "join"), ("slow", "join")] {
            dag.add_edge(Edge::new(from, to, FieldMap::new())).expect("edge");
        }

        assert_eq!(find_critical_path(&dag), vec!["root", "slow", "join"]);
    }

    #[test]
    fn test_tie_breaks_by_insertion_order() {
        let mut dag = Dag::new("test");
        // Two equal-latency chains; the first-inserted chain wins.
        dag.add_node(node("a1", 100)).expect("node");
        dag.add_node(node("b1", 100)).expect("node");
        dag.add_node(node("a2", 100)).expect("node");
        dag.add_node(node("b2", 100)).expect("node");
        dag.add_edge(Edge::new("a1", "b1", FieldMap::new())).expect("edge");
        dag.add_edge(Edge::new("a2", "b2", FieldMap::new())).expect("edge");

        assert_eq!(find_critical_path(&dag), vec!["a1", "b1"]);
    }

    #[test]
    fn test_unestimated_nodes_count_as_unit_latency() {
        let mut dag = Dag::new("test");
        // Three-node chain of unestimated nodes outweighs a 2ms single node.
        for id in ["a", "b", "c"] {
            dag.add_node(Node::tool(id, "noop")).expect("node");
        }
        dag.add_node(node("x", 2)).expect("node");
        dag.add_edge(Edge::new("a", "b", FieldMap::new())).expect("edge");
        dag.add_edge(Edge::new("b", "c", FieldMap::new())).expect("edge");

        assert_eq!(find_critical_path(&dag), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_dag() {
        let dag = Dag::new("empty");
        assert!(find_critical_path(&dag).is_empty());
    }
}
