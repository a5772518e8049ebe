//! Model-call node handler.
//!
//! Renders the node's prompt template against its assembled inputs with
//! MiniJinja, routes the request through the model registry, and maps the
//! response into the node's output fields. Fields the inputs do not
//! provide render as empty strings.

use minijinja::Environment;
use once_cell::sync::Lazy;

use tygent_core::error::RuntimeError;
use tygent_core::traits::{ModelRequest, ModelResponse};
use tygent_core::tygent_model;
use tygent_core::types::{Node, NodeKind, Value, ValueMap};

use crate::executor::ExecutionContext;

/// Global MiniJinja environment for inline template rendering.
static TEMPLATE_ENV: Lazy<Environment<'static>> = Lazy::new(Environment::new);

/// Render a prompt template against a node's inputs.
pub fn render_template(template: &str, inputs: &ValueMap) -> Result<String, RuntimeError> {
    TEMPLATE_ENV
        .render_str(template, inputs)
        .map_err(|e| RuntimeError::Model {
            message: format!("Prompt template failed to render: {}", e),
            backend: None,
        })
}

/// Execute a single model node.
pub async fn execute(
    ctx: &ExecutionContext,
    node: &Node,
    inputs: ValueMap,
) -> Result<ValueMap, RuntimeError> {
    let request = build_request(node, &inputs)?;
    let backend = ctx.models.resolve(&request.model)?;

    tygent_model!(debug,
        node = %node.id,
        model = %request.model,
        backend = %backend.name(),
        "Model request"
    );

    let response = backend.generate(request).await?;
    Ok(apply_response(ctx, node, response))
}

/// Execute a batch group of model nodes as one backend call.
///
/// All nodes resolve through the first node's model; the orchestrator
/// only groups nodes that share one. A batch failure fails every node in
/// the group, since they shared the provider round-trip.
pub async fn execute_batch(
    ctx: &ExecutionContext,
    group: &[(Node, ValueMap)],
) -> Result<Vec<ValueMap>, RuntimeError> {
    if group.is_empty() {
        return Ok(Vec::new());
    }

    let mut requests = Vec::with_capacity(group.len());
    for (node, inputs) in group {
        requests.push(build_request(node, inputs)?);
    }

    let model = requests[0].model.clone();
    let backend = ctx.models.resolve(&model)?;

    tygent_model!(debug,
        model = %model,
        backend = %backend.name(),
        batch = group.len(),
        "Batched model request"
    );

    let responses = backend.generate_batch(requests).await?;
    if responses.len() != group.len() {
        return Err(RuntimeError::Model {
            message: format!(
                "Backend returned {} response(s) for a batch of {}",
                responses.len(),
                group.len()
            ),
            backend: Some(backend.name().to_string()),
        });
    }

    Ok(group
        .iter()
        .zip(responses)
        .map(|((node, _), response)| apply_response(ctx, node, response))
        .collect())
}

/// Build the model request for a node from its inputs.
fn build_request(node: &Node, inputs: &ValueMap) -> Result<ModelRequest, RuntimeError> {
    let NodeKind::Model {
        model,
        system_prompt,
        prompt,
    } = &node.kind
    else {
        return Err(RuntimeError::Node {
            node: node.id.clone(),
            message: "Dispatched to model handler without a model kind".to_string(),
        });
    };

    Ok(ModelRequest {
        model: model.clone(),
        system_prompt: system_prompt.clone(),
        prompt: render_template(prompt, inputs)?,
    })
}

/// Map a response into the node's output fields and stage the shared
/// memory write when the node carries a memory key.
fn apply_response(ctx: &ExecutionContext, node: &Node, response: ModelResponse) -> ValueMap {
    if let Some(key) = &node.memory_key {
        ctx.memory
            .stage(key.clone(), Value::String(response.text.clone()));
    }

    let mut outputs = ValueMap::new();
    if let Some(confidence) = response.confidence {
        outputs.insert("confidence".to_string(), Value::from(confidence));
    }
    outputs.insert("response".to_string(), Value::String(response.text));
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tygent_core::traits::ModelBackend;

    struct Echo;

    #[async_trait]
    impl ModelBackend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, RuntimeError> {
            Ok(ModelResponse {
                text: request.prompt,
                confidence: Some(0.9),
            })
        }
    }

    #[test]
    fn test_render_template_substitutes_fields() {
        let inputs = ValueMap::from([
            ("query".to_string(), Value::from("rust")),
            ("temperature".to_string(), Value::from(72)),
        ]);
        let rendered =
            render_template("Search {{ query }} at {{ temperature }}F", &inputs).expect("render");
        assert_eq!(rendered, "Search rust at 72F");
    }

    #[test]
    fn test_render_template_missing_field_is_empty() {
        let rendered = render_template("context: {{ absent }}.", &ValueMap::new()).expect("render");
        assert_eq!(rendered, "context: .");
    }

    #[tokio::test]
    async fn test_model_execution_maps_outputs() {
        let ctx = ExecutionContext::new();
        ctx.models.set_default(Arc::new(Echo));

        let node = Node::model("process", "gpt-4o", "Analyze {{ topic }}")
            .with_outputs(["response", "confidence"]);
        let inputs = ValueMap::from([("topic".to_string(), Value::from("graphs"))]);

        let outputs = execute(&ctx, &node, inputs).await.expect("execute");
        assert_eq!(outputs.get("response"), Some(&Value::from("Analyze graphs")));
        assert_eq!(outputs.get("confidence"), Some(&Value::from(0.9)));
    }

    #[tokio::test]
    async fn test_memory_key_stages_response() {
        let ctx = ExecutionContext::new();
        ctx.models.set_default(Arc::new(Echo));

        let node = Node::model("agent_researcher", "gpt-4o", "{{ query }}")
            .with_outputs(["response"])
            .with_memory_key("researcher");
        let inputs = ValueMap::from([("query".to_string(), Value::from("why"))]);

        execute(&ctx, &node, inputs).await.expect("execute");

        // Staged, not committed: invisible until the wave boundary.
        assert_eq!(ctx.memory.get("researcher"), None);
        ctx.memory.commit_wave().expect("commit");
        assert_eq!(ctx.memory.get("researcher"), Some(Value::from("why")));
    }

    #[tokio::test]
    async fn test_batch_distributes_responses() {
        let ctx = ExecutionContext::new();
        ctx.models.set_default(Arc::new(Echo));

        let a = Node::model("a", "gpt-4o", "first {{ q }}").with_outputs(["response"]);
        let b = Node::model("b", "gpt-4o", "second {{ q }}").with_outputs(["response"]);
        let inputs = ValueMap::from([("q".to_string(), Value::from("x"))]);

        let group = vec![(a, inputs.clone()), (b, inputs)];
        let outputs = execute_batch(&ctx, &group).await.expect("batch");

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].get("response"), Some(&Value::from("first x")));
        assert_eq!(outputs[1].get("response"), Some(&Value::from("second x")));
    }
}
