//! Tool and model registries.
//!
//! Thread-safe lookup tables the dispatcher resolves nodes against.
//! Lock-free reads via DashMap; registration is an error on name reuse.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use tygent_core::error::RuntimeError;
use tygent_core::traits::{ModelBackend, ToolExecutor};

/// Concurrent tool registry.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// # Errors
    ///
    /// Returns an error if a tool with the same name already exists.
    pub fn register(&self, tool: Arc<dyn ToolExecutor>) -> Result<(), RuntimeError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RuntimeError::Tool {
                tool: name.clone(),
                message: format!("Tool '{}' is already registered", name),
            });
        }

        tracing::info!("Registered tool: {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no tool with that name is registered.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ToolExecutor>, RuntimeError> {
        self.tools
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RuntimeError::Tool {
                tool: name.to_string(),
                message: format!("Tool '{}' is not registered", name),
            })
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Concurrent model backend registry with a default backend.
///
/// Nodes name a *model*; the registry routes the call to the backend
/// registered under that model name, falling back to the default backend
/// for unknown names.
#[derive(Default)]
pub struct ModelRegistry {
    backends: DashMap<String, Arc<dyn ModelBackend>>,
    default: RwLock<Option<Arc<dyn ModelBackend>>>,
}

impl ModelRegistry {
    /// Create a new empty model registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own name.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend with the same name already exists.
    pub fn register(&self, backend: Arc<dyn ModelBackend>) -> Result<(), RuntimeError> {
        let name = backend.name().to_string();
        if self.backends.contains_key(&name) {
            return Err(RuntimeError::Model {
                message: format!("Backend '{}' is already registered", name),
                backend: Some(name),
            });
        }

        tracing::info!("Registered model backend: {}", name);
        self.backends.insert(name, backend);
        Ok(())
    }

    /// Set the default backend used for model names without a dedicated
    /// registration. Registers the backend as well if it is new.
    pub fn set_default(&self, backend: Arc<dyn ModelBackend>) {
        if !self.backends.contains_key(backend.name()) {
            self.backends
                .insert(backend.name().to_string(), Arc::clone(&backend));
        }
        *self.default.write() = Some(backend);
    }

    /// Resolve a backend for a model name.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a named backend nor a default exists.
    pub fn resolve(&self, model: &str) -> Result<Arc<dyn ModelBackend>, RuntimeError> {
        if let Some(entry) = self.backends.get(model) {
            return Ok(Arc::clone(entry.value()));
        }
        self.default
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| RuntimeError::Model {
                message: format!("No backend registered for model '{}'", model),
                backend: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tygent_core::traits::{FnTool, ModelRequest, ModelResponse};
    use tygent_core::types::ValueMap;

    struct Echo;

    #[async_trait]
    impl ModelBackend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, RuntimeError> {
            Ok(ModelResponse::text(request.prompt))
        }
    }

    #[test]
    fn test_tool_duplicate_registration() {
        let registry = ToolRegistry::new();
        let tool = || Arc::new(FnTool::new("noop", |_: ValueMap| async { Ok(ValueMap::new()) }));

        registry.register(tool()).expect("first registration");
        assert!(registry.register(tool()).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tool_lookup_missing() {
        let registry = ToolRegistry::new();
        assert!(registry.get("absent").is_err());
    }

    #[test]
    fn test_model_resolution_falls_back_to_default() {
        let registry = ModelRegistry::new();
        assert!(registry.resolve("gpt-4o").is_err());

        registry.set_default(Arc::new(Echo));
        let backend = registry.resolve("gpt-4o").expect("default fallback");
        assert_eq!(backend.name(), "echo");

        let named = registry.resolve("echo").expect("named lookup");
        assert_eq!(named.name(), "echo");
    }
}
