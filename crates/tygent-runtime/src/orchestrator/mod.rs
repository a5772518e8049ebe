//! Multi-agent conversation orchestration.
//!
//! Builds a conversation DAG over role-configured agents — one model-call
//! node per role per round — and executes it on the same
//! scheduler/executor stack as any other DAG. Construction is
//! deterministic: identical roles, query, and settings produce a
//! structurally identical graph.

mod settings;

pub use settings::{AgentRole, DependencyPolicy, OptimizationSettings};

use tygent_core::error::{GraphError, RuntimeError};
use tygent_core::tygent_sched;
use tygent_core::types::{
    Dag, Edge, ExecutionResult, FieldMap, MemoryOp, Node, NodeId, NodeOutcome, Value, ValueMap,
};

use crate::executor::{AdaptiveExecutor, EarlyStop, ExecutionContext};
use crate::scheduler::find_critical_path;

/// Builds and runs conversation DAGs over a set of agents.
pub struct MultiAgentOrchestrator {
    /// Agents in insertion order; order is the tie-break for chaining
    /// and node layout.
    agents: Vec<(String, AgentRole)>,
    /// Model name stamped on every agent node.
    model: String,
    /// Conversation rounds; one node per agent per round.
    rounds: usize,
    /// Intra-round dependency wiring.
    policy: DependencyPolicy,
}

impl MultiAgentOrchestrator {
    /// Creates an orchestrator with no agents, one round, and the
    /// independent dependency policy.
    pub fn new() -> Self {
        MultiAgentOrchestrator {
            agents: Vec::new(),
            model: "default".to_string(),
            rounds: 1,
            policy: DependencyPolicy::Independent,
        }
    }

    /// Sets the model name used by agent nodes.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the number of conversation rounds (clamped to at least 1).
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    /// Sets the intra-round dependency policy.
    pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers an agent.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] when the agent id is taken.
    pub fn add_agent(
        &mut self,
        id: impl Into<String>,
        role: AgentRole,
    ) -> Result<(), GraphError> {
        let id = id.into();
        if self.agents.iter().any(|(existing, _)| existing == &id) {
            return Err(GraphError::DuplicateNode { id });
        }
        self.agents.push((id, role));
        Ok(())
    }

    /// Registered agent ids in insertion order.
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Build the conversation DAG for a query.
    ///
    /// Deterministic given the same agents, rounds, policy, and
    /// settings. Node ids are `agent_<id>` in round 1,
    /// `agent_<id>_r<k>` in later rounds, and `memory_r<k>` for the
    /// per-round shared-memory snapshot.
    ///
    /// # Errors
    ///
    /// Propagates graph construction errors; a [`GraphError::Cycle`] can
    /// only arise from a custom policy that contradicts the insertion
    /// order chaining of `parallel_thinking = false`.
    pub fn create_conversation_dag(
        &self,
        query: &str,
        settings: &OptimizationSettings,
    ) -> Result<Dag, GraphError> {
        let order: Vec<String> = self.agents.iter().map(|(id, _)| id.clone()).collect();
        let mut dag = Dag::new(format!("conversation:{}", query));

        for round in 1..=self.rounds {
            // All of the round's agent nodes exist before any edge.
            for (agent, role) in &self.agents {
                let deps = self.effective_deps(agent, &order, settings);
                dag.add_node(self.agent_node(agent, role, round, &deps, settings))?;
            }

            for (agent, _) in &self.agents {
                let id = agent_node_id(agent, round);

                if round > 1 {
                    if settings.shared_memory {
                        let mut fields = FieldMap::new();
                        fields.insert("memory".to_string(), "memory".to_string());
                        dag.add_edge(Edge::new(memory_node_id(round - 1), id.clone(), fields))?;
                    } else {
                        for prev in &order {
                            let mut fields = FieldMap::new();
                            fields.insert("response".to_string(), format!("prev_{}", prev));
                            dag.add_edge(Edge::new(
                                agent_node_id(prev, round - 1),
                                id.clone(),
                                fields,
                            ))?;
                        }
                    }
                }

                for dep in self.effective_deps(agent, &order, settings) {
                    let mut fields = FieldMap::new();
                    fields.insert("response".to_string(), format!("context_{}", dep));
                    dag.add_edge(Edge::new(agent_node_id(&dep, round), id.clone(), fields))?;
                }
            }

            if settings.shared_memory {
                dag.add_node(
                    Node::memory(memory_node_id(round), MemoryOp::Snapshot)
                        .with_outputs(["memory"]),
                )?;
                for (agent, _) in &self.agents {
                    dag.add_edge(Edge::new(
                        agent_node_id(agent, round),
                        memory_node_id(round),
                        FieldMap::new(),
                    ))?;
                }
            }
        }

        tygent_sched!(debug,
            agents = self.agents.len(),
            rounds = self.rounds,
            nodes = dag.len(),
            "Conversation DAG built"
        );
        Ok(dag)
    }

    /// Longest dependency chain of a conversation DAG.
    pub fn find_critical_path(&self, dag: &Dag) -> Vec<NodeId> {
        find_critical_path(dag)
    }

    /// Build the conversation DAG and execute it.
    ///
    /// The query is supplied to every agent node as the `query` initial
    /// input, and results come back keyed by the node ids documented on
    /// [`create_conversation_dag`](Self::create_conversation_dag).
    pub async fn execute_conversation(
        &self,
        ctx: ExecutionContext,
        query: &str,
        settings: &OptimizationSettings,
    ) -> Result<ExecutionResult, RuntimeError> {
        let dag = self.create_conversation_dag(query, settings)?;

        let mut executor = AdaptiveExecutor::new(dag).with_context(ctx);
        if settings.early_stop_threshold > 0.0 {
            // The criterion is round-granular: the signal stays at zero
            // until some round has fully completed, then reports that
            // round's best confidence.
            let round_nodes: Vec<Vec<NodeId>> = (1..=self.rounds)
                .map(|round| {
                    self.agents
                        .iter()
                        .map(|(id, _)| agent_node_id(id, round))
                        .collect()
                })
                .collect();
            executor = executor.with_early_stop(EarlyStop::new(
                settings.early_stop_threshold,
                move |results| {
                    round_nodes
                        .iter()
                        .rev()
                        .find(|nodes| {
                            nodes.iter().all(|id| {
                                results.get(id).map(NodeOutcome::is_value).unwrap_or(false)
                            })
                        })
                        .map(|nodes| max_reported_confidence(nodes, results))
                        .unwrap_or(0.0)
                },
            ));
        }

        let mut initial = ValueMap::new();
        initial.insert("query".to_string(), Value::String(query.to_string()));
        executor.execute(initial).await
    }

    /// Intra-round upstreams: the policy's wiring, plus insertion-order
    /// chaining when parallel thinking is off.
    fn effective_deps(
        &self,
        agent: &str,
        order: &[String],
        settings: &OptimizationSettings,
    ) -> Vec<String> {
        let mut deps = self.policy.upstreams(agent, order);
        if !settings.parallel_thinking {
            let position = order.iter().position(|id| id == agent);
            if let Some(i) = position {
                if i > 0 && !deps.contains(&order[i - 1]) {
                    deps.push(order[i - 1].clone());
                }
            }
        }
        deps
    }

    /// Build one agent node.
    fn agent_node(
        &self,
        agent: &str,
        role: &AgentRole,
        round: usize,
        deps: &[String],
        settings: &OptimizationSettings,
    ) -> Node {
        let mut prompt = String::from("Query: {{ query }}");
        let mut optional: Vec<String> = Vec::new();

        if round > 1 {
            if settings.shared_memory {
                prompt.push_str("\n\nShared memory so far:\n{{ memory }}");
                optional.push("memory".to_string());
            } else {
                for prev in self.agents.iter().map(|(id, _)| id) {
                    prompt.push_str(&format!(
                        "\n\n{} said previously:\n{{{{ prev_{} }}}}",
                        prev, prev
                    ));
                    optional.push(format!("prev_{}", prev));
                }
            }
        }

        for dep in deps {
            prompt.push_str(&format!("\n\n{} says:\n{{{{ context_{} }}}}", dep, dep));
            optional.push(format!("context_{}", dep));
        }

        let mut node = Node::model(agent_node_id(agent, round), self.model.clone(), prompt)
            .with_system_prompt(role.system_prompt.clone())
            .with_required_inputs(["query"])
            .with_optional_inputs(optional)
            .with_outputs(["response", "confidence"]);

        if settings.batch_messages {
            node = node.with_batch_key(format!("round_{}", round));
        }
        if settings.shared_memory {
            node = node.with_memory_key(agent.to_string());
        }
        node
    }
}

impl Default for MultiAgentOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Node id for an agent's turn in a round.
fn agent_node_id(agent: &str, round: usize) -> NodeId {
    if round == 1 {
        format!("agent_{}", agent)
    } else {
        format!("agent_{}_r{}", agent, round)
    }
}

/// Node id for a round's shared-memory snapshot.
fn memory_node_id(round: usize) -> NodeId {
    format!("memory_r{}", round)
}

/// The maximum confidence the given nodes have reported.
fn max_reported_confidence(
    nodes: &[NodeId],
    results: &std::collections::HashMap<NodeId, NodeOutcome>,
) -> f64 {
    nodes
        .iter()
        .filter_map(|id| results.get(id))
        .filter_map(NodeOutcome::value)
        .filter_map(|outputs| outputs.get("confidence"))
        .filter_map(Value::as_f64)
        .fold(0.0, f64::max)
}

/// Helper wiring for the classic researcher/critic/synthesizer shape.
pub fn review_policy(
    researcher: &str,
    critic: &str,
    synthesizer: &str,
) -> DependencyPolicy {
    DependencyPolicy::Custom(std::collections::HashMap::from([
        (critic.to_string(), vec![researcher.to_string()]),
        (
            synthesizer.to_string(),
            vec![researcher.to_string(), critic.to_string()],
        ),
    ]))
}
