// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use dagflow::engine::{Node, Pipeline};
use dagflow::observability::init_tracing;
use dagflow::traits::LogicResult;
use dagflow::value::{Payload, Value, ValueType};

fn integer(inputs: &Payload, key: &str) -> anyhow::Result<i64> {
    inputs
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow::anyhow!("input '{}' is missing or not an integer", key))
}

fn summator(inputs: Payload) -> LogicResult {
    let sum = integer(&inputs, "input1")? + integer(&inputs, "input2")?;
    Ok(Payload::from([("sum".to_string(), Value::from(sum))]))
}

fn multiplier(inputs: Payload) -> LogicResult {
    let output = integer(&inputs, "sum")? * integer(&inputs, "multiplier")?;
    Ok(Payload::from([("output".to_string(), Value::from(output))]))
}

/// input1, input2 -> [Summator] -> sum; sum, multiplier -> [Multiplier] -> output
fn sum_then_multiply() -> Result<Pipeline, Box<dyn std::error::Error>> {
    let mut inner = Pipeline::new("SumThenMultiply");
    let input1 = inner.declare_channel("input1", ValueType::Integer)?;
    let input2 = inner.declare_channel("input2", ValueType::Integer)?;
    let factor = inner.declare_channel("multiplier", ValueType::Integer)?;
    let sum = inner.declare_channel("sum", ValueType::Integer)?;
    let output = inner.declare_channel("output", ValueType::Integer)?;

    inner.add_node(Node::transform("Summator", vec![input1, input2], vec![sum.clone()], summator)?)?;
    inner.add_node(Node::transform("Multiplier", vec![sum, factor], vec![output], multiplier)?)?;
    Ok(inner)
}

/// Demo showing a hand-built graph: a source feeds a composite node whose inner
/// pipeline sums then multiplies, and a sink prints the result.
async fn run_pipeline_demo() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Hand-Built Pipeline Demo ===\n");

    let mut pipeline = Pipeline::new("Demo");
    let input1 = pipeline.declare_channel("input1", ValueType::Integer)?;
    let input2 = pipeline.declare_channel("input2", ValueType::Integer)?;
    let factor = pipeline.declare_channel("multiplier", ValueType::Integer)?;
    let output = pipeline.declare_channel("output", ValueType::Integer)?;

    pipeline.add_node(Node::source("Inputs", vec![input1.clone(), input2.clone()], || {
        Ok(Payload::from([
            ("input1".to_string(), Value::from(2)),
            ("input2".to_string(), Value::from(3)),
        ]))
    })?)?;
    pipeline.add_node(Node::composite(
        "SumThenMultiply",
        vec![input1, input2, factor],
        vec![output.clone()],
        sum_then_multiply()?,
    )?)?;
    pipeline.add_node(Node::sink("Printer", vec![output], |inputs: Payload| {
        if let Some(value) = inputs.get("output") {
            println!("Printer received: {}", value);
        }
        Ok(Payload::new())
    })?)?;

    println!("Nodes:");
    for node in pipeline.nodes() {
        println!("- {} ({})", node.name(), node.kind());
    }

    println!("\nRunning with multiplier = 10...");
    let report = pipeline
        .run_to_completion(Payload::from([("multiplier".to_string(), Value::from(10))]))
        .await?;

    println!("\nCompleted {} nodes in {:?}", report.completed.len(), report.duration);
    println!("Completion order: {}", report.completed.join(" -> "));

    println!("\nDemo completed successfully!");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("dagflow=info");
    run_pipeline_demo().await
}
