//! Execution context - Holds runtime state and provides access to subsystems.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::memory::SharedMemory;
use crate::registry::{ModelRegistry, ToolRegistry};

/// Execution context passed to all node handlers.
///
/// Provides access to:
/// - Tool registry for tool nodes
/// - Model registry for model-call nodes
/// - Shared memory store (wave-consistent)
/// - Execution metadata (id, start time, custom entries)
#[derive(Clone)]
pub struct ExecutionContext {
    /// Unique execution ID for tracing.
    pub execution_id: String,
    /// Tool registry for tool nodes.
    pub tools: Arc<ToolRegistry>,
    /// Model registry for model-call nodes.
    pub models: Arc<ModelRegistry>,
    /// Shared memory store for memory nodes and staged agent writes.
    pub memory: Arc<SharedMemory>,
    /// Start time of execution (for timing).
    pub start_time: Instant,
    /// Custom metadata.
    pub metadata: HashMap<String, String>,
}

impl ExecutionContext {
    /// Create a new execution context with empty registries and a fresh
    /// memory store.
    pub fn new() -> Self {
        Self {
            execution_id: uuid::Uuid::now_v7().to_string(),
            tools: Arc::new(ToolRegistry::new()),
            models: Arc::new(ModelRegistry::new()),
            memory: Arc::new(SharedMemory::default()),
            start_time: Instant::now(),
            metadata: HashMap::new(),
        }
    }

    /// Use a specific tool registry.
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    /// Use a specific model registry.
    pub fn with_models(mut self, models: Arc<ModelRegistry>) -> Self {
        self.models = models;
        self
    }

    /// Use a specific shared memory store.
    pub fn with_memory(mut self, memory: Arc<SharedMemory>) -> Self {
        self.memory = memory;
        self
    }

    /// Create context with a specific execution ID.
    pub fn with_execution_id(mut self, execution_id: String) -> Self {
        self.execution_id = execution_id;
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Get elapsed time since the context was created.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Create a child context with a new execution ID, sharing the
    /// registries and memory store.
    pub fn child(&self) -> Self {
        Self {
            execution_id: uuid::Uuid::now_v7().to_string(),
            tools: Arc::clone(&self.tools),
            models: Arc::clone(&self.models),
            memory: Arc::clone(&self.memory),
            start_time: Instant::now(),
            metadata: self.metadata.clone(),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_context_creation() {
        let ctx = ExecutionContext::new();
        assert!(!ctx.execution_id.is_empty());
        assert!(ctx.metadata.is_empty());
        assert!(ctx.tools.is_empty());
    }

    #[test]
    fn test_child_context_shares_memory() {
        let parent = ExecutionContext::new()
            .with_metadata("session".to_string(), "s1".to_string());
        let child = parent.child();

        assert_ne!(child.execution_id, parent.execution_id);
        assert_eq!(child.metadata.get("session"), Some(&"s1".to_string()));
        assert!(Arc::ptr_eq(&child.memory, &parent.memory));
    }
}
