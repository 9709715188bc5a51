// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Document model for declarative pipeline definitions.
//!
//! Required fields are `Option`s here and are checked by the interpreter, so that a
//! missing field is reported against the channel or node it belongs to rather than as
//! a bare parse error.
//!
//! # Example
//! ```yaml
//! pipeline:
//!   name: Adder
//!   options:
//!     failure_strategy: fail_fast
//!     receive_timeout_ms: 5000
//!   channels:
//!     - name: x
//!       type: integer
//!     - name: y
//!       type: integer
//!     - name: sum
//!       type: integer
//!   nodes:
//!     - name: Summator
//!       inputs: [x, y]
//!       outputs: [sum]
//!       logic: sum
//!   initial_data:
//!     x: 10
//!     y: 5
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::RunOptions;
use crate::errors::FailureStrategy;
use crate::value::Value;

/// Top level of a definition file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionDocument {
    pub pipeline: Option<PipelineDefinition>,
}

/// A pipeline block. Nested blocks (inside a composite node) share the shape but may
/// not carry `initial_data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineDefinition {
    pub name: Option<String>,
    pub channels: Option<Vec<ChannelDefinition>>,
    pub nodes: Option<Vec<NodeDefinition>>,
    /// Initial values keyed by channel name.
    pub initial_data: Option<BTreeMap<String, Literal>>,
    pub options: Option<OptionsDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelDefinition {
    pub name: Option<String>,
    /// One of the names in [`crate::value::TYPE_NAMES`].
    #[serde(rename = "type")]
    pub value_type: Option<String>,
}

/// A node entry. Exactly one of `logic` (a registry key) or `pipeline` (a nested
/// definition, making the node a composite) must be given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeDefinition {
    pub name: Option<String>,
    /// `source`, `sink`, `transform` or `composite`; inferred from the wiring when absent.
    pub kind: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    pub logic: Option<String>,
    pub pipeline: Option<Box<PipelineDefinition>>,
}

/// Run options as written in a definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionsDefinition {
    pub failure_strategy: Option<FailureStrategy>,
    pub receive_timeout_ms: Option<u64>,
    pub validate_inputs: Option<bool>,
}

impl OptionsDefinition {
    /// Fill in [`RunOptions`] defaults for everything left unset.
    pub fn to_run_options(&self) -> RunOptions {
        let defaults = RunOptions::default();
        RunOptions {
            failure_strategy: self.failure_strategy.unwrap_or(defaults.failure_strategy),
            receive_timeout: self
                .receive_timeout_ms
                .map(Duration::from_millis)
                .or(defaults.receive_timeout),
            validate_inputs: self.validate_inputs.unwrap_or(defaults.validate_inputs),
        }
    }
}

/// A literal initial value, in whatever shape the document format produced.
///
/// Conversion to a [`Value`] depends on the target channel's declared type; see the
/// interpreter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<Literal>),
    Mapping(BTreeMap<String, Literal>),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Boolean(v) => Value::Boolean(v),
            Literal::Integer(v) => Value::Integer(v),
            Literal::Float(v) => Value::Float(v),
            Literal::Text(v) => Value::Text(v),
            Literal::Sequence(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Literal::Mapping(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
