// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builds a wired [`Pipeline`] and its initial data from a definition document.
//!
//! Interpretation never runs anything. It either returns a complete pipeline or the
//! first problem it found, naming the channel, node or logic key at fault; there is
//! no partially wired result.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::channel::Channel;
use crate::config::definition::{DefinitionDocument, Literal, NodeDefinition, PipelineDefinition};
use crate::config::loader::{load_definition, parse_definition, DefinitionFormat};
use crate::config::LogicRegistry;
use crate::engine::{Node, NodeKind, Pipeline};
use crate::errors::{DefinitionError, GraphError};
use crate::observability::messages::interpreter::DefinitionInterpreted;
use crate::observability::messages::StructuredLog;
use crate::traits::Logic;
use crate::value::{Payload, Value, ValueType};

#[derive(Debug)]
pub struct DslInterpreter {
    definition: PipelineDefinition,
    registry: LogicRegistry,
}

impl DslInterpreter {
    pub fn new(document: DefinitionDocument, registry: LogicRegistry) -> Result<Self, DefinitionError> {
        let definition = document.pipeline.ok_or_else(|| DefinitionError::MissingField {
            item: "definition".to_string(),
            field: "pipeline",
        })?;
        Ok(Self {
            definition,
            registry,
        })
    }

    pub fn from_yaml(text: &str, registry: LogicRegistry) -> Result<Self, DefinitionError> {
        Self::new(parse_definition(text, DefinitionFormat::Yaml)?, registry)
    }

    pub fn from_json(text: &str, registry: LogicRegistry) -> Result<Self, DefinitionError> {
        Self::new(parse_definition(text, DefinitionFormat::Json)?, registry)
    }

    pub fn from_toml(text: &str, registry: LogicRegistry) -> Result<Self, DefinitionError> {
        Self::new(parse_definition(text, DefinitionFormat::Toml)?, registry)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, registry: LogicRegistry) -> Result<Self, DefinitionError> {
        Self::new(load_definition(path)?, registry)
    }

    pub fn registry(&self) -> &LogicRegistry {
        &self.registry
    }

    /// Build the pipeline and convert its initial data. The pipeline is ready to `run`
    /// with the returned payload.
    pub fn interpret(&self) -> Result<(Pipeline, Payload), DefinitionError> {
        let pipeline = self.build_pipeline(&self.definition, "pipeline")?;

        let mut initial = Payload::new();
        for (name, literal) in self.definition.initial_data.iter().flatten() {
            let channel = pipeline
                .channel(name)
                .ok_or_else(|| GraphError::UnknownChannel {
                    pipeline: pipeline.name().to_string(),
                    channel: name.clone(),
                    referenced_by: "initial data".to_string(),
                })?;
            initial.insert(name.clone(), literal_to_value(channel, literal)?);
        }

        DefinitionInterpreted {
            pipeline: pipeline.name(),
            channel_count: pipeline.channels().count(),
            node_count: pipeline.nodes().count(),
            initial_count: initial.len(),
        }
        .log();
        Ok((pipeline, initial))
    }

    /// `item` names the block for error messages: `pipeline` at the top, `node 'X'
    /// pipeline` for nested ones.
    fn build_pipeline(&self, definition: &PipelineDefinition, item: &str) -> Result<Pipeline, DefinitionError> {
        let name = required(&definition.name, item, "name")?;
        let options = definition
            .options
            .as_ref()
            .map(|options| options.to_run_options())
            .unwrap_or_default();
        let mut pipeline = Pipeline::with_options(name, options);

        for (index, channel) in required(&definition.channels, item, "channels")?.iter().enumerate() {
            let channel_name = required(&channel.name, &format!("channel #{}", index + 1), "name")?;
            let type_name = required(&channel.value_type, &format!("channel '{}'", channel_name), "type")?;
            let value_type = ValueType::from_name(type_name).ok_or_else(|| DefinitionError::UnknownType {
                channel: channel_name.to_string(),
                type_name: type_name.to_string(),
            })?;
            pipeline.declare_channel(channel_name, value_type)?;
        }

        for (index, node) in required(&definition.nodes, item, "nodes")?.iter().enumerate() {
            let node_name = required(&node.name, &format!("node #{}", index + 1), "name")?;
            let built = self.build_node(&pipeline, node_name, node)?;
            pipeline.add_node(built)?;
        }

        Ok(pipeline)
    }

    fn build_node(&self, pipeline: &Pipeline, name: &str, node: &NodeDefinition) -> Result<Node, DefinitionError> {
        let item = format!("node '{}'", name);
        let inputs = resolve_channels(pipeline, name, &node.inputs)?;
        let outputs = resolve_channels(pipeline, name, &node.outputs)?;
        let kind = node_kind(&item, node)?;

        match (kind, &node.logic, &node.pipeline) {
            (_, Some(_), Some(_)) => Err(DefinitionError::InvalidDefinition {
                item,
                reason: "give either 'logic' or a nested 'pipeline', not both".to_string(),
            }),
            (NodeKind::Composite, None, Some(inner)) => {
                if inner.initial_data.is_some() {
                    return Err(DefinitionError::InvalidDefinition {
                        item,
                        reason: "a nested pipeline cannot declare initial_data".to_string(),
                    });
                }
                let inner = self.build_pipeline(inner, &format!("{} pipeline", item))?;
                Ok(Node::composite(name, inputs, outputs, inner)?)
            }
            (NodeKind::Composite, _, None) => Err(DefinitionError::MissingField {
                item,
                field: "pipeline",
            }),
            (_, None, Some(_)) => Err(DefinitionError::InvalidDefinition {
                item,
                reason: format!("a {} node cannot wrap a nested pipeline", kind),
            }),
            (_, Some(key), None) => {
                let logic = self.resolve_logic(name, key, kind)?;
                Ok(Node::from_logic(kind, name, inputs, outputs, logic)?)
            }
            (_, None, None) => Err(DefinitionError::MissingField { item, field: "logic" }),
        }
    }

    fn resolve_logic(&self, node: &str, key: &str, kind: NodeKind) -> Result<Logic, DefinitionError> {
        let logic = self.registry.get(key).ok_or_else(|| DefinitionError::UnknownLogic {
            node: node.to_string(),
            logic: key.to_string(),
        })?;

        let expected = match kind {
            NodeKind::Source => "producer",
            _ => "function",
        };
        if logic.shape() != expected {
            return Err(DefinitionError::LogicShape {
                node: node.to_string(),
                logic: key.to_string(),
                expected,
            });
        }
        Ok(logic.clone())
    }
}

fn required<'a, T>(field: &'a Option<T>, item: &str, name: &'static str) -> Result<&'a T, DefinitionError> {
    field.as_ref().ok_or_else(|| DefinitionError::MissingField {
        item: item.to_string(),
        field: name,
    })
}

fn resolve_channels(pipeline: &Pipeline, node: &str, names: &[String]) -> Result<Vec<Channel>, DefinitionError> {
    names
        .iter()
        .map(|name| {
            pipeline.channel(name).cloned().ok_or_else(|| {
                DefinitionError::from(GraphError::UnknownChannel {
                    pipeline: pipeline.name().to_string(),
                    channel: name.clone(),
                    referenced_by: format!("node '{}'", node),
                })
            })
        })
        .collect()
}

fn node_kind(item: &str, node: &NodeDefinition) -> Result<NodeKind, DefinitionError> {
    match node.kind.as_deref().map(str::trim) {
        Some(kind) => match kind.to_ascii_lowercase().as_str() {
            "source" => Ok(NodeKind::Source),
            "sink" => Ok(NodeKind::Sink),
            "transform" => Ok(NodeKind::Transform),
            "composite" => Ok(NodeKind::Composite),
            other => Err(DefinitionError::InvalidDefinition {
                item: item.to_string(),
                reason: format!(
                    "unknown kind '{}' (expected source, sink, transform or composite)",
                    other
                ),
            }),
        },
        None if node.pipeline.is_some() => Ok(NodeKind::Composite),
        None if node.inputs.is_empty() => Ok(NodeKind::Source),
        None if node.outputs.is_empty() => Ok(NodeKind::Sink),
        None => Ok(NodeKind::Transform),
    }
}

/// Convert a literal for `channel`. Integers widen to float channels, and bytes
/// channels take base64 text or a list of integers in 0..=255. Anything else must
/// already have the channel's shape.
fn literal_to_value(channel: &Channel, literal: &Literal) -> Result<Value, DefinitionError> {
    let invalid = |reason: String| DefinitionError::InvalidLiteral {
        channel: channel.name().to_string(),
        reason,
    };

    let value = match (channel.value_type(), literal) {
        (ValueType::Float, Literal::Integer(v)) => Value::Float(*v as f64),
        (ValueType::Bytes, Literal::Text(encoded)) => STANDARD
            .decode(encoded)
            .map(Value::Bytes)
            .map_err(|e| invalid(format!("not valid base64: {}", e)))?,
        (ValueType::Bytes, Literal::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Literal::Integer(byte) => {
                    u8::try_from(*byte).map_err(|_| invalid(format!("{} is not a byte value", byte)))
                }
                other => Err(invalid(format!("{:?} is not a byte value", other))),
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Value::Bytes)?,
        (_, literal) => Value::from(literal.clone()),
    };

    channel.check(&value)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(value_type: ValueType) -> Channel {
        Channel::new("c", value_type)
    }

    #[test]
    fn test_literal_conversion() {
        struct TestCase {
            name: &'static str,
            declared: ValueType,
            literal: Literal,
            expected: Value,
        }

        let test_cases = vec![
            TestCase { name: "integer", declared: ValueType::Integer, literal: Literal::Integer(4), expected: Value::from(4) },
            TestCase { name: "widened", declared: ValueType::Float, literal: Literal::Integer(4), expected: Value::from(4.0) },
            TestCase { name: "float", declared: ValueType::Float, literal: Literal::Float(0.5), expected: Value::from(0.5) },
            TestCase {
                name: "base64 bytes",
                declared: ValueType::Bytes,
                literal: Literal::Text("aGk=".to_string()),
                expected: Value::from(b"hi".to_vec()),
            },
            TestCase {
                name: "list bytes",
                declared: ValueType::Bytes,
                literal: Literal::Sequence(vec![Literal::Integer(0), Literal::Integer(255)]),
                expected: Value::from(vec![0u8, 255u8]),
            },
            TestCase {
                name: "any keeps natural shape",
                declared: ValueType::Any,
                literal: Literal::Sequence(vec![Literal::Integer(1)]),
                expected: Value::from(vec![Value::from(1)]),
            },
        ];

        for case in test_cases {
            let value = literal_to_value(&channel(case.declared), &case.literal).unwrap();
            assert_eq!(value, case.expected, "{}", case.name);
        }
    }

    #[test]
    fn test_literal_conversion_errors() {
        let narrowed = literal_to_value(&channel(ValueType::Integer), &Literal::Float(1.5)).unwrap_err();
        assert!(matches!(narrowed, DefinitionError::Graph(GraphError::Channel(_))));

        let bad_base64 = literal_to_value(&channel(ValueType::Bytes), &Literal::Text("***".to_string())).unwrap_err();
        assert!(matches!(bad_base64, DefinitionError::InvalidLiteral { .. }));

        let too_big = literal_to_value(
            &channel(ValueType::Bytes),
            &Literal::Sequence(vec![Literal::Integer(256)]),
        )
        .unwrap_err();
        assert!(matches!(too_big, DefinitionError::InvalidLiteral { ref reason, .. } if reason.contains("256")));
    }

    #[test]
    fn test_kind_inference() {
        let node = |inputs: &[&str], outputs: &[&str], kind: Option<&str>| NodeDefinition {
            name: Some("n".to_string()),
            kind: kind.map(str::to_string),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            logic: Some("f".to_string()),
            pipeline: None,
        };

        assert_eq!(node_kind("n", &node(&[], &["o"], None)).unwrap(), NodeKind::Source);
        assert_eq!(node_kind("n", &node(&["i"], &[], None)).unwrap(), NodeKind::Sink);
        assert_eq!(node_kind("n", &node(&["i"], &["o"], None)).unwrap(), NodeKind::Transform);
        assert_eq!(node_kind("n", &node(&["i"], &["o"], Some(" Sink "))).unwrap(), NodeKind::Sink);
        assert!(matches!(
            node_kind("n", &node(&["i"], &["o"], Some("filter"))),
            Err(DefinitionError::InvalidDefinition { .. })
        ));
    }
}
