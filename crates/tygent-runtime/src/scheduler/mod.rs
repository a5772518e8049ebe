//! Dependency-aware scheduling: wave planning and critical-path analysis.

mod config;
mod critical_path;
mod plan;

pub use config::ExecutorConfig;
pub use critical_path::find_critical_path;
pub use plan::{build_waves, ExecutionPlan};

use tygent_core::error::RuntimeError;
use tygent_core::types::{Dag, NodeId};

/// Computes execution plans for a DAG.
///
/// The scheduler is analysis-only; the adaptive executor recomputes the
/// ready frontier itself because guard pruning can invalidate a static
/// plan mid-run.
pub struct Scheduler<'a> {
    dag: &'a Dag,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler over a DAG.
    pub fn new(dag: &'a Dag) -> Self {
        Scheduler { dag }
    }

    /// Compute the concurrent wave plan.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Scheduler`] if no wave can be formed while
    /// nodes remain (defensive; unreachable for graphs built through
    /// [`Dag::add_edge`]).
    pub fn plan(&self) -> Result<ExecutionPlan, RuntimeError> {
        build_waves(self.dag)
    }

    /// Longest dependency chain by cumulative estimated latency.
    pub fn critical_path(&self) -> Vec<NodeId> {
        find_critical_path(self.dag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tygent_core::types::{Edge, FieldMap, Node};

    #[test]
    fn test_scheduler_wraps_plan_and_path() {
        let mut dag = Dag::new("test");
        dag.add_node(Node::tool("a", "noop").with_estimated_latency_ms(10))
            .expect("node");
        dag.add_node(Node::tool("b", "noop").with_estimated_latency_ms(20))
            .expect("node");
        dag.add_edge(Edge::new("a", "b", FieldMap::new()))
            .expect("edge");

        let scheduler = Scheduler::new(&dag);
        let plan = scheduler.plan().expect("plan");
        assert_eq!(plan.waves.len(), 2);
        assert_eq!(scheduler.critical_path(), vec!["a", "b"]);
    }
}
