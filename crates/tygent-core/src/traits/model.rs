//! Model backend seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// A single model invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Model name, as declared on the node.
    pub model: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Rendered user prompt.
    pub prompt: String,
}

/// A model's answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Generated text.
    pub text: String,
    /// Optional self-reported confidence in [0, 1]; feeds early stopping.
    pub confidence: Option<f64>,
}

impl ModelResponse {
    /// A plain text response without a confidence signal.
    pub fn text(text: impl Into<String>) -> Self {
        ModelResponse {
            text: text.into(),
            confidence: None,
        }
    }
}

/// An LLM backend. One registered instance can serve many model names.
///
/// `generate_batch` exists so the executor can collapse a batch group
/// into a single provider round-trip; the default implementation simply
/// loops `generate`.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Registry name of the backend.
    fn name(&self) -> &str;

    /// Generate a response for a single request.
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, RuntimeError>;

    /// Generate responses for a group of requests in one call.
    async fn generate_batch(
        &self,
        requests: Vec<ModelRequest>,
    ) -> Result<Vec<ModelResponse>, RuntimeError> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(self.generate(request).await?);
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl ModelBackend for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, RuntimeError> {
            Ok(ModelResponse::text(request.prompt.to_uppercase()))
        }
    }

    #[tokio::test]
    async fn test_default_batch_loops_generate() {
        let backend = Upper;
        let requests = vec![
            ModelRequest {
                model: "m".to_string(),
                system_prompt: None,
                prompt: "one".to_string(),
            },
            ModelRequest {
                model: "m".to_string(),
                system_prompt: None,
                prompt: "two".to_string(),
            },
        ];

        let responses = backend.generate_batch(requests).await.expect("batch");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].text, "ONE");
        assert_eq!(responses[1].text, "TWO");
    }
}
