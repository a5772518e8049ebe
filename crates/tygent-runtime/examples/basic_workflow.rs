//! Basic workflow example: a customer-support agent.
//!
//! Demonstrates core engine features:
//! - Building a DAG of tool nodes with field-mapped edges
//! - Parallel execution of independent branches
//! - Per-node timings and critical-path analysis
//!
//! Run: `cargo run --example basic_workflow -p tygent-runtime`

use std::sync::Arc;
use std::time::Duration;

use tygent_core::types::{Dag, Edge, FieldMap, Node, Value, ValueMap};
use tygent_runtime::{AdaptiveExecutor, ExecutionContext, FnTool, Scheduler};

fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(s, d)| (s.to_string(), d.to_string()))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let ctx = ExecutionContext::new();

    // Tools simulate a knowledge base, a customer database, and response
    // generation, each with a latency to make the parallelism visible.
    ctx.tools.register(Arc::new(FnTool::new(
        "analyze_question",
        |inputs: ValueMap| async move {
            let question = inputs.get("question").and_then(Value::as_str).unwrap_or("");
            tokio::time::sleep(Duration::from_millis(100)).await;
            let intent = if question.contains("return") {
                "product_return"
            } else {
                "general"
            };
            Ok(ValueMap::from([(
                "intent".to_string(),
                Value::from(intent),
            )]))
        },
    )))?;

    ctx.tools.register(Arc::new(FnTool::new(
        "search_knowledge_base",
        |inputs: ValueMap| async move {
            let intent = inputs.get("intent").and_then(Value::as_str).unwrap_or("");
            tokio::time::sleep(Duration::from_millis(150)).await;
            let answer = match intent {
                "product_return" => "Products can be returned within 30 days with receipt.",
                _ => "No specific information found.",
            };
            Ok(ValueMap::from([(
                "knowledge_result".to_string(),
                Value::from(answer),
            )]))
        },
    )))?;

    ctx.tools.register(Arc::new(FnTool::new(
        "get_customer_history",
        |inputs: ValueMap| async move {
            let user_id = inputs.get("user_id").and_then(Value::as_str).unwrap_or("");
            tokio::time::sleep(Duration::from_millis(180)).await;
            let name = if user_id == "user123" { "Jane Smith" } else { "Customer" };
            Ok(ValueMap::from([(
                "customer_name".to_string(),
                Value::from(name),
            )]))
        },
    )))?;

    ctx.tools.register(Arc::new(FnTool::new(
        "generate_response",
        |inputs: ValueMap| async move {
            let name = inputs
                .get("customer_name")
                .and_then(Value::as_str)
                .unwrap_or("there");
            let answer = inputs
                .get("knowledge_result")
                .and_then(Value::as_str)
                .unwrap_or("");
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(ValueMap::from([(
                "response_text".to_string(),
                Value::String(format!("Hello {}, {}", name, answer)),
            )]))
        },
    )))?;

    // The knowledge branch and the customer branch are independent and
    // run concurrently; the response node joins them.
    let mut dag = Dag::new("customer_support_agent");
    dag.add_node(
        Node::tool("analyze", "analyze_question")
            .with_required_inputs(["question"])
            .with_outputs(["intent"])
            .with_estimated_latency_ms(100),
    )?;
    dag.add_node(
        Node::tool("knowledge", "search_knowledge_base")
            .with_required_inputs(["intent"])
            .with_outputs(["knowledge_result"])
            .with_estimated_latency_ms(150),
    )?;
    dag.add_node(
        Node::tool("customer", "get_customer_history")
            .with_required_inputs(["user_id"])
            .with_outputs(["customer_name"])
            .with_estimated_latency_ms(180),
    )?;
    dag.add_node(
        Node::tool("response", "generate_response")
            .with_required_inputs(["question"])
            .with_optional_inputs(["knowledge_result", "customer_name"])
            .with_outputs(["response_text"])
            .with_estimated_latency_ms(100),
    )?;

    dag.add_edge(Edge::new("analyze", "knowledge", fields(&[("intent", "intent")])))?;
    dag.add_edge(Edge::new(
        "knowledge",
        "response",
        fields(&[("knowledge_result", "knowledge_result")]),
    ))?;
    dag.add_edge(Edge::new(
        "customer",
        "response",
        fields(&[("customer_name", "customer_name")]),
    ))?;

    let scheduler = Scheduler::new(&dag);
    println!("Waves: {:?}", scheduler.plan()?.waves);
    println!("Critical path: {:?}", scheduler.critical_path());

    let executor = AdaptiveExecutor::new(dag).with_context(ctx);
    let result = executor
        .execute(ValueMap::from([
            (
                "question".to_string(),
                Value::from("Can I return the headphones I bought last month?"),
            ),
            ("user_id".to_string(), Value::from("user123")),
        ]))
        .await?;

    println!("\nTotal time: {:?}", result.total);
    for (node, duration) in &result.timings {
        println!("  {}: {:?}", node, duration);
    }

    if let Some(outputs) = result.output("response") {
        println!("\n{}", outputs["response_text"]);
    }

    Ok(())
}
