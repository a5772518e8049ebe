//! Tool execution seam.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::RuntimeError;
use crate::types::ValueMap;

/// An executable tool: an async function from named inputs to named
/// outputs. Provider-specific failures are wrapped into
/// [`RuntimeError::Tool`] by implementations.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Registry name of the tool.
    fn name(&self) -> &str;

    /// Invoke the tool with the node's assembled inputs.
    async fn invoke(&self, inputs: ValueMap) -> Result<ValueMap, RuntimeError>;
}

type ToolFuture = Pin<Box<dyn Future<Output = Result<ValueMap, RuntimeError>> + Send>>;

/// Adapter turning an async closure into a [`ToolExecutor`].
pub struct FnTool {
    name: String,
    func: Box<dyn Fn(ValueMap) -> ToolFuture + Send + Sync>,
}

impl FnTool {
    /// Wraps an async closure as a named tool.
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ValueMap) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ValueMap, RuntimeError>> + Send + 'static,
    {
        FnTool {
            name: name.into(),
            func: Box::new(move |inputs| Box::pin(func(inputs))),
        }
    }
}

#[async_trait]
impl ToolExecutor for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, inputs: ValueMap) -> Result<ValueMap, RuntimeError> {
        (self.func)(inputs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[tokio::test]
    async fn test_fn_tool_invocation() {
        let tool = FnTool::new("echo", |inputs: ValueMap| async move {
            let mut outputs = ValueMap::new();
            outputs.insert(
                "echoed".to_string(),
                inputs.get("message").cloned().unwrap_or(Value::Null),
            );
            Ok(outputs)
        });

        assert_eq!(tool.name(), "echo");

        let mut inputs = ValueMap::new();
        inputs.insert("message".to_string(), Value::from("hello"));
        let outputs = tool.invoke(inputs).await.expect("invoke");
        assert_eq!(outputs.get("echoed"), Some(&Value::from("hello")));
    }
}
