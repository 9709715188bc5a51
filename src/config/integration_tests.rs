// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Definition documents interpreted against a registry and run end to end.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{DslInterpreter, LogicRegistry};
use crate::engine::NodeKind;
use crate::errors::{DefinitionError, FailureStrategy, GraphError};
use crate::stub;
use crate::value::{Payload, Value, ValueType};

const SUM_YAML: &str = r#"
pipeline:
  name: SumPipeline
  channels:
    - { name: x, type: integer }
    - { name: y, type: integer }
    - { name: sum, type: integer }
  nodes:
    - name: Summator
      inputs: [x, y]
      outputs: [sum]
      logic: sum
  initial_data:
    x: 10
    y: 5
"#;

fn registry() -> LogicRegistry {
    let mut registry = LogicRegistry::new();
    registry
        .register_function("sum", stub::sum_of("x", "y", "sum"))
        .register_function("sum_inputs", stub::sum_of("input1", "input2", "sum"))
        .register_function("multiply", stub::product_of("sum", "multiplier", "output"))
        .register_producer("two_and_three", || {
            Ok(Payload::from([
                ("input1".to_string(), Value::from(2)),
                ("input2".to_string(), Value::from(3)),
            ]))
        });
    registry
}

#[tokio::test]
async fn test_interpret_and_run_sum() {
    let (pipeline, initial) = DslInterpreter::from_yaml(SUM_YAML, registry())
        .unwrap()
        .interpret()
        .unwrap();

    assert_eq!(pipeline.name(), "SumPipeline");
    assert_eq!(pipeline.node("Summator").map(|n| n.kind()), Some(NodeKind::Transform));
    assert_eq!(initial.get("x"), Some(&Value::from(10)));

    pipeline.run_to_completion(initial).await.unwrap();
    assert_eq!(pipeline.channel("sum").unwrap().try_receive(), Some(Value::from(15)));
}

#[tokio::test]
async fn test_sum_definition_file() {
    let (pipeline, initial) = DslInterpreter::from_file("configs/sum-pipeline.yaml", registry())
        .unwrap()
        .interpret()
        .unwrap();

    let _handle = pipeline.run(initial).unwrap();
    assert_eq!(pipeline.receive("sum").await.unwrap(), Value::from(15));
}

#[test]
fn test_unknown_logic_key_names_node_and_key() {
    let yaml = SUM_YAML.replace("logic: sum", "logic: missing_fn");

    let err = DslInterpreter::from_yaml(&yaml, registry())
        .unwrap()
        .interpret()
        .unwrap_err();

    match err {
        DefinitionError::UnknownLogic { node, logic } => {
            assert_eq!(node, "Summator");
            assert_eq!(logic, "missing_fn");
        }
        other => panic!("expected unknown logic, got {:?}", other),
    }
}

#[test]
fn test_unknown_type_name_is_rejected_not_evaluated() {
    let yaml = SUM_YAML.replace("{ name: y, type: integer }", "{ name: y, type: \"__import__('os')\" }");

    let err = DslInterpreter::from_yaml(&yaml, registry())
        .unwrap()
        .interpret()
        .unwrap_err();

    assert!(matches!(err, DefinitionError::UnknownType { ref channel, .. } if channel == "y"));
}

#[test]
fn test_missing_fields_name_the_item() {
    struct TestCase {
        name: &'static str,
        yaml: String,
        item: &'static str,
        field: &'static str,
    }

    let test_cases = vec![
        TestCase {
            name: "channel type",
            yaml: SUM_YAML.replace("{ name: y, type: integer }", "{ name: y }"),
            item: "channel 'y'",
            field: "type",
        },
        TestCase {
            name: "node name",
            yaml: SUM_YAML.replace("- name: Summator", "- label: Summator"),
            item: "node #1",
            field: "name",
        },
        TestCase {
            name: "node logic",
            yaml: SUM_YAML.replace("      logic: sum\n", ""),
            item: "node 'Summator'",
            field: "logic",
        },
        TestCase {
            name: "pipeline name",
            yaml: SUM_YAML.replace("  name: SumPipeline\n", ""),
            item: "pipeline",
            field: "name",
        },
    ];

    for case in test_cases {
        let err = DslInterpreter::from_yaml(&case.yaml, registry())
            .and_then(|interpreter| interpreter.interpret().map(|_| ()))
            .unwrap_err();
        match err {
            DefinitionError::MissingField { item, field } => {
                assert_eq!(item, case.item, "{}", case.name);
                assert_eq!(field, case.field, "{}", case.name);
            }
            other => panic!("{}: expected missing field, got {:?}", case.name, other),
        }
    }
}

#[test]
fn test_missing_pipeline_block() {
    let err = DslInterpreter::from_yaml("other: 1\n", registry()).unwrap_err();
    assert!(matches!(err, DefinitionError::MissingField { field: "pipeline", .. }));

    let interpreter = DslInterpreter::from_yaml(SUM_YAML, registry()).unwrap();
    assert!(format!("{:?}", interpreter).contains("LogicRegistry"));
}

#[test]
fn test_channel_reference_errors() {
    let undeclared_input = SUM_YAML.replace("inputs: [x, y]", "inputs: [x, z]");
    let err = DslInterpreter::from_yaml(&undeclared_input, registry())
        .unwrap()
        .interpret()
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Graph(GraphError::UnknownChannel { ref channel, ref referenced_by, .. })
            if channel == "z" && referenced_by == "node 'Summator'"
    ));

    let undeclared_seed = SUM_YAML.replace("    y: 5", "    y: 5\n    w: 1");
    let err = DslInterpreter::from_yaml(&undeclared_seed, registry())
        .unwrap()
        .interpret()
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Graph(GraphError::UnknownChannel { ref channel, .. }) if channel == "w"
    ));

    let duplicate = SUM_YAML.replace(
        "- { name: sum, type: integer }",
        "- { name: sum, type: integer }\n    - { name: x, type: text }",
    );
    let err = DslInterpreter::from_yaml(&duplicate, registry())
        .unwrap()
        .interpret()
        .unwrap_err();
    assert!(matches!(
        err,
        DefinitionError::Graph(GraphError::DuplicateChannel { ref channel, .. }) if channel == "x"
    ));
}

#[test]
fn test_seed_type_mismatch() {
    let yaml = SUM_YAML.replace("x: 10", "x: ten");

    let err = DslInterpreter::from_yaml(&yaml, registry())
        .unwrap()
        .interpret()
        .unwrap_err();

    assert!(matches!(err, DefinitionError::Graph(GraphError::Channel(_))));
}

#[test]
fn test_logic_shape_must_fit_kind() {
    let yaml = r#"
pipeline:
  name: Shapes
  channels:
    - { name: out, type: integer }
  nodes:
    - name: Generator
      outputs: [out]
      logic: sum
"#;

    let err = DslInterpreter::from_yaml(yaml, registry())
        .unwrap()
        .interpret()
        .unwrap_err();

    assert!(matches!(
        err,
        DefinitionError::LogicShape { ref node, expected: "producer", .. } if node == "Generator"
    ));
}

#[test]
fn test_logic_and_pipeline_are_exclusive() {
    let yaml = r#"
pipeline:
  name: Both
  channels:
    - { name: a, type: integer }
    - { name: b, type: integer }
  nodes:
    - name: Confused
      inputs: [a]
      outputs: [b]
      logic: sum
      pipeline:
        name: Inner
        channels: []
        nodes: []
"#;

    let err = DslInterpreter::from_yaml(yaml, registry())
        .unwrap()
        .interpret()
        .unwrap_err();

    assert!(matches!(err, DefinitionError::InvalidDefinition { ref item, .. } if item == "node 'Confused'"));
}

#[test]
fn test_nested_pipeline_cannot_seed() {
    let yaml = r#"
pipeline:
  name: Outer
  channels:
    - { name: a, type: integer }
    - { name: b, type: integer }
  nodes:
    - name: Wrapped
      inputs: [a]
      outputs: [b]
      pipeline:
        name: Inner
        channels:
          - { name: a, type: integer }
          - { name: b, type: integer }
        nodes:
          - { name: Copy, inputs: [a], outputs: [b], logic: sum }
        initial_data:
          a: 1
"#;

    let err = DslInterpreter::from_yaml(yaml, registry())
        .unwrap()
        .interpret()
        .unwrap_err();

    assert!(matches!(err, DefinitionError::InvalidDefinition { ref item, .. } if item == "node 'Wrapped'"));
}

#[tokio::test]
async fn test_composite_definition_file() {
    let printed = Arc::new(Mutex::new(Vec::new()));
    let mut registry = registry();
    registry.register_function("print", stub::recorder(Arc::clone(&printed)));

    let (pipeline, initial) = DslInterpreter::from_file("configs/composite-pipeline.yaml", registry)
        .unwrap()
        .interpret()
        .unwrap();

    assert_eq!(pipeline.options().receive_timeout, Some(Duration::from_secs(5)));
    let composite = pipeline.node("SumThenMultiply").unwrap();
    assert_eq!(composite.kind(), NodeKind::Composite);
    assert_eq!(composite.inner_pipeline().map(|p| p.name()), Some("SumThenMultiplyInner"));

    pipeline.run_to_completion(initial).await.unwrap();

    let printed = printed.lock().unwrap();
    assert_eq!(printed.len(), 1);
    assert_eq!(printed[0].get("output"), Some(&Value::from(50)));
}

#[tokio::test]
async fn test_json_definition_with_widening_and_bytes() {
    let mut registry = LogicRegistry::new();
    registry.register_function("scale", |inputs: Payload| {
        let gain = inputs
            .get("gain")
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow::anyhow!("gain missing"))?;
        let header = inputs.get("header").and_then(Value::as_bytes).unwrap_or_default();
        anyhow::ensure!(header == b"DDF1", "unexpected header");

        let scaled: Vec<Value> = inputs
            .get("samples")
            .and_then(Value::as_sequence)
            .unwrap_or_default()
            .iter()
            .map(|sample| match sample {
                Value::Integer(n) => Value::from(*n as f64 * gain),
                Value::Float(f) => Value::from(f * gain),
                other => other.clone(),
            })
            .collect();
        Ok(Payload::from([("scaled".to_string(), Value::from(scaled))]))
    });

    let (pipeline, initial) = DslInterpreter::from_file("configs/signal-pipeline.json", registry)
        .unwrap()
        .interpret()
        .unwrap();

    assert_eq!(initial.get("gain"), Some(&Value::from(2.0)));
    assert_eq!(initial.get("header"), Some(&Value::from(b"DDF1".to_vec())));
    assert_eq!(pipeline.options().failure_strategy, FailureStrategy::ContinueOnError);
    assert_eq!(pipeline.channel("samples").map(|c| c.value_type()), Some(ValueType::Sequence));

    pipeline.run_to_completion(initial).await.unwrap();
    assert_eq!(
        pipeline.channel("scaled").unwrap().try_receive(),
        Some(Value::from(vec![Value::from(2.0), Value::from(5.0), Value::from(8.0)]))
    );
}

#[tokio::test]
async fn test_toml_definition() {
    let toml = r#"
[pipeline]
name = "TomlSum"

[[pipeline.channels]]
name = "x"
type = "int"

[[pipeline.channels]]
name = "y"
type = "int"

[[pipeline.channels]]
name = "sum"
type = "int"

[[pipeline.nodes]]
name = "Summator"
inputs = ["x", "y"]
outputs = ["sum"]
logic = "sum"

[pipeline.initial_data]
x = 1
y = 2
"#;

    let (pipeline, initial) = DslInterpreter::from_toml(toml, registry())
        .unwrap()
        .interpret()
        .unwrap();

    pipeline.run_to_completion(initial).await.unwrap();
    assert_eq!(pipeline.channel("sum").unwrap().try_receive(), Some(Value::from(3)));
}

#[test]
fn test_interpreting_twice_builds_independent_pipelines() {
    let interpreter = DslInterpreter::from_json(
        r#"{"pipeline": {"name": "J", "channels": [{"name": "x", "type": "integer"}], "nodes": []}}"#,
        registry(),
    )
    .unwrap();

    let (first, _) = interpreter.interpret().unwrap();
    let (second, _) = interpreter.interpret().unwrap();

    assert!(!first
        .channel("x")
        .unwrap()
        .same_channel(second.channel("x").unwrap()));
    assert!(interpreter.registry().contains_key("sum"));
}
