//! Multi-agent conversation example.
//!
//! Demonstrates:
//! - Role-configured agents (researcher, critic, synthesizer)
//! - Parallel thinking and shared memory
//! - Critical-path analysis of the conversation DAG
//!
//! Run: `cargo run --example multi_agent -p tygent-runtime`

use std::sync::Arc;

use async_trait::async_trait;
use tygent_core::traits::{ModelBackend, ModelRequest, ModelResponse};
use tygent_runtime::orchestrator::review_policy;
use tygent_runtime::{
    AgentRole, ExecutionContext, MultiAgentOrchestrator, OptimizationSettings, RuntimeError,
};

/// Offline stand-in for a provider backend.
struct CannedBackend;

#[async_trait]
impl ModelBackend for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, RuntimeError> {
        let role = request
            .system_prompt
            .unwrap_or_else(|| "You answer.".to_string());
        Ok(ModelResponse {
            text: format!("[{}] considered: {}", role, request.prompt.len()),
            confidence: Some(0.7),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut orchestrator = MultiAgentOrchestrator::new()
        .with_model("gpt-4o")
        .with_policy(review_policy("researcher", "critic", "synthesizer"));

    orchestrator.add_agent(
        "researcher",
        AgentRole::new(
            "Researcher",
            "Specializes in finding and analyzing information.",
            "You are a skilled researcher who excels at gathering relevant information.",
        ),
    )?;
    orchestrator.add_agent(
        "critic",
        AgentRole::new(
            "Critic",
            "Identifies flaws and suggests improvements.",
            "You are a thoughtful critic who evaluates information critically.",
        ),
    )?;
    orchestrator.add_agent(
        "synthesizer",
        AgentRole::new(
            "Synthesizer",
            "Combines insights into a coherent whole.",
            "You are an expert synthesizer who brings together different perspectives.",
        ),
    )?;

    let query = "What are the potential benefits and risks of quantum computing?";
    let settings = OptimizationSettings::new()
        .with_parallel_thinking(true)
        .with_shared_memory(true);

    let dag = orchestrator.create_conversation_dag(query, &settings)?;
    println!(
        "Critical path: {}",
        orchestrator.find_critical_path(&dag).join(" -> ")
    );

    let ctx = ExecutionContext::new();
    ctx.models.set_default(Arc::new(CannedBackend));

    let result = orchestrator
        .execute_conversation(ctx, query, &settings)
        .await?;

    println!("\nConversation results ({:?} total):", result.total);
    for id in ["agent_researcher", "agent_critic", "agent_synthesizer"] {
        if let Some(outputs) = result.output(id) {
            println!("\n== {} ==\n{}", id, outputs["response"]);
        }
    }

    Ok(())
}
