//! Orchestrator configuration: roles, optimization settings, and the
//! dependency policy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Immutable description of one agent's role in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRole {
    /// Display name.
    pub name: String,
    /// One-line description of the role's specialty.
    pub description: String,
    /// System prompt applied to every model call for this role.
    pub system_prompt: String,
}

impl AgentRole {
    /// Creates a role.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        AgentRole {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
        }
    }
}

/// Conversation optimization settings.
///
/// Plain configuration data; every recognized option is listed here and
/// defaults are what the field defaults say, nothing hidden.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSettings {
    /// Group each round's agent calls into one batched backend call.
    #[serde(default)]
    pub batch_messages: bool,

    /// Let agents without mutual dependencies think in the same wave.
    /// When false, each round's agents are chained in insertion order.
    #[serde(default)]
    pub parallel_thinking: bool,

    /// Share one memory store across agents: responses are staged under
    /// the agent id and a snapshot node synchronizes each round.
    #[serde(default)]
    pub shared_memory: bool,

    /// Stop scheduling further rounds once the convergence signal (the
    /// maximum reported confidence) reaches this value. 0 disables early
    /// stopping.
    #[serde(default)]
    pub early_stop_threshold: f64,
}

impl OptimizationSettings {
    /// Settings with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable message batching.
    pub fn with_batch_messages(mut self, on: bool) -> Self {
        self.batch_messages = on;
        self
    }

    /// Enable or disable parallel thinking.
    pub fn with_parallel_thinking(mut self, on: bool) -> Self {
        self.parallel_thinking = on;
        self
    }

    /// Enable or disable the shared memory store.
    pub fn with_shared_memory(mut self, on: bool) -> Self {
        self.shared_memory = on;
        self
    }

    /// Set the early-stop threshold (0 disables).
    pub fn with_early_stop_threshold(mut self, threshold: f64) -> Self {
        self.early_stop_threshold = threshold;
        self
    }
}

/// Which upstream agents feed which downstream agent within a round.
///
/// The wiring rule is configuration rather than a hardcoded convention:
/// the classic researcher/critic/synthesizer shape is a [`Custom`] map
/// (critic reads the researcher, the synthesizer reads both).
///
/// [`Custom`]: DependencyPolicy::Custom
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyPolicy {
    /// No intra-round dependencies; agents are mutually independent.
    #[default]
    Independent,
    /// Each agent reads the previous agent, in insertion order.
    Pipeline,
    /// Explicit upstream agent ids per agent id. Agents absent from the
    /// map have no intra-round dependencies.
    Custom(HashMap<String, Vec<String>>),
}

impl DependencyPolicy {
    /// Upstream agent ids for `agent`, given the insertion-ordered agent
    /// list.
    pub(crate) fn upstreams(&self, agent: &str, order: &[String]) -> Vec<String> {
        match self {
            DependencyPolicy::Independent => Vec::new(),
            DependencyPolicy::Pipeline => {
                let position = order.iter().position(|id| id == agent);
                match position {
                    Some(i) if i > 0 => vec![order[i - 1].clone()],
                    _ => Vec::new(),
                }
            }
            DependencyPolicy::Custom(map) => map
                .get(agent)
                .map(|deps| {
                    deps.iter()
                        .filter(|dep| order.iter().any(|id| id == *dep))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Vec<String> {
        vec![
            "researcher".to_string(),
            "critic".to_string(),
            "synthesizer".to_string(),
        ]
    }

    #[test]
    fn test_independent_has_no_upstreams() {
        let policy = DependencyPolicy::Independent;
        assert!(policy.upstreams("critic", &order()).is_empty());
    }

    #[test]
    fn test_pipeline_reads_previous_agent() {
        let policy = DependencyPolicy::Pipeline;
        assert!(policy.upstreams("researcher", &order()).is_empty());
        assert_eq!(policy.upstreams("critic", &order()), vec!["researcher"]);
        assert_eq!(policy.upstreams("synthesizer", &order()), vec!["critic"]);
    }

    #[test]
    fn test_custom_filters_unknown_agents() {
        let policy = DependencyPolicy::Custom(HashMap::from([(
            "synthesizer".to_string(),
            vec![
                "researcher".to_string(),
                "critic".to_string(),
                "ghost".to_string(),
            ],
        )]));
        assert_eq!(
            policy.upstreams("synthesizer", &order()),
            vec!["researcher", "critic"]
        );
        assert!(policy.upstreams("researcher", &order()).is_empty());
    }

    #[test]
    fn test_settings_builder() {
        let settings = OptimizationSettings::new()
            .with_parallel_thinking(true)
            .with_shared_memory(true)
            .with_early_stop_threshold(0.8);
        assert!(settings.parallel_thinking);
        assert!(settings.shared_memory);
        assert!(!settings.batch_messages);
        assert_eq!(settings.early_stop_threshold, 0.8);
    }
}
