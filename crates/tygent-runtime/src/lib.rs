//! Tygent Runtime - Execution engine for typed LLM workflow DAGs.
//!
//! The runtime provides:
//! - **Scheduler**: dependency waves and critical-path analysis
//! - **AdaptiveExecutor**: concurrent wave execution with guard pruning,
//!   partial-failure semantics, early stopping, and cancellation
//! - **SharedMemory**: wave-consistent store shared by concurrent nodes
//! - **MultiAgentOrchestrator**: conversation DAGs over role-configured
//!   agents
//!
//! # Example
//!
//! ```no_run
//! use tygent_core::types::{Dag, Node, ValueMap};
//! use tygent_runtime::AdaptiveExecutor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dag = Dag::new("workflow");
//!     dag.add_node(Node::tool("search", "web_search").with_outputs(["results"]))?;
//!
//!     let executor = AdaptiveExecutor::new(dag);
//!     let result = executor.execute(ValueMap::new()).await?;
//!     println!("completed: {}", result.completed());
//!     Ok(())
//! }
//! ```

pub mod executor;
pub mod memory;
pub mod orchestrator;
pub mod registry;
pub mod scheduler;

pub use executor::{AdaptiveExecutor, CancelHandle, EarlyStop, ExecutionContext, NodeDispatcher};
pub use memory::{MemoryConfig, SharedMemory};
pub use orchestrator::{
    AgentRole, DependencyPolicy, MultiAgentOrchestrator, OptimizationSettings,
};
pub use registry::{ModelRegistry, ToolRegistry};
pub use scheduler::{find_critical_path, ExecutionPlan, ExecutorConfig, Scheduler};

pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

// Re-export commonly used types
pub use tygent_core::{
    error::{GraphError, RuntimeError},
    traits::{FnTool, ModelBackend, ModelRequest, ModelResponse, ToolExecutor},
    types::{Dag, Edge, ExecutionResult, FieldMap, Node, NodeOutcome, SkipReason, Value, ValueMap},
};
