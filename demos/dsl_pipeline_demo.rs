// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;

use dagflow::config::{DslInterpreter, LogicRegistry};
use dagflow::observability::init_tracing;
use dagflow::value::{Payload, Value};

fn integer(inputs: &Payload, key: &str) -> anyhow::Result<i64> {
    inputs
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow::anyhow!("input '{}' is missing or not an integer", key))
}

/// Logic for the definitions under `configs/`.
fn demo_registry() -> LogicRegistry {
    let mut registry = LogicRegistry::new();
    registry
        .register_function("sum", |inputs| {
            let sum = integer(&inputs, "x")? + integer(&inputs, "y")?;
            Ok(Payload::from([("sum".to_string(), Value::from(sum))]))
        })
        .register_function("sum_inputs", |inputs| {
            let sum = integer(&inputs, "input1")? + integer(&inputs, "input2")?;
            Ok(Payload::from([("sum".to_string(), Value::from(sum))]))
        })
        .register_function("multiply", |inputs| {
            let output = integer(&inputs, "sum")? * integer(&inputs, "multiplier")?;
            Ok(Payload::from([("output".to_string(), Value::from(output))]))
        })
        .register_producer("two_and_three", || {
            Ok(Payload::from([
                ("input1".to_string(), Value::from(2)),
                ("input2".to_string(), Value::from(3)),
            ]))
        })
        .register_function("print", |inputs| {
            let mut names: Vec<&String> = inputs.keys().collect();
            names.sort();
            for name in names {
                println!("Printer received {} = {}", name, inputs[name]);
            }
            Ok(Payload::new())
        });
    registry
}

/// Demo showing a pipeline built from a definition file.
/// Usage: cargo run --example dsl_pipeline_demo [definition_file]
async fn run_dsl_pipeline_demo(definition_file: String) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Declarative Pipeline Demo ===\n");

    println!("Interpreting {}...", definition_file);
    let interpreter = DslInterpreter::from_file(&definition_file, demo_registry())?;
    let (pipeline, initial) = interpreter.interpret()?;

    println!("Pipeline '{}' built:", pipeline.name());
    for channel in pipeline.channels() {
        println!("- channel {} : {}", channel.name(), channel.value_type());
    }
    for node in pipeline.nodes() {
        println!("- node {} ({})", node.name(), node.kind());
    }
    println!("- options: {:?}", pipeline.options());

    println!("\nRunning...");
    let report = pipeline.run_to_completion(initial).await?;

    for channel in pipeline.channels() {
        if let Some(value) = channel.try_receive() {
            println!("Channel '{}' holds {}", channel.name(), value);
        }
    }
    println!("\nCompleted {} nodes in {:?}", report.completed.len(), report.duration);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("dagflow=info");

    let definition_file = env::args()
        .nth(1)
        .unwrap_or_else(|| "configs/composite-pipeline.yaml".to_string());
    run_dsl_pipeline_demo(definition_file).await
}
