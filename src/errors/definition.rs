// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while loading or interpreting a declarative pipeline definition.

use std::path::PathBuf;

use thiserror::Error;

use crate::errors::{ChannelError, GraphError};

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to read definition '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported definition format for '{}' (expected .yaml, .yml, .json or .toml)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    /// `item` names the offending entry, e.g. `node 'Summator'` or `channel #2`.
    #[error("{item} is missing required field '{field}'")]
    MissingField { item: String, field: &'static str },

    #[error("{item} is invalid: {reason}")]
    InvalidDefinition { item: String, reason: String },

    #[error("Channel '{channel}' declares unknown type '{type_name}'")]
    UnknownType { channel: String, type_name: String },

    #[error("Node '{node}' references logic '{logic}' which is not in the registry")]
    UnknownLogic { node: String, logic: String },

    #[error("Node '{node}' needs {expected} logic but '{logic}' is registered with a different shape")]
    LogicShape {
        node: String,
        logic: String,
        expected: &'static str,
    },

    #[error("Initial value for channel '{channel}' is invalid: {reason}")]
    InvalidLiteral { channel: String, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<ChannelError> for DefinitionError {
    fn from(error: ChannelError) -> Self {
        DefinitionError::Graph(GraphError::Channel(error))
    }
}
