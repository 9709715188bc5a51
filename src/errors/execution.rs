// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime errors surfaced when joining pipeline workers.

use serde::Deserialize;
use thiserror::Error;

use crate::errors::{ChannelError, GraphError};

/// How a run reacts to the first failing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Cancel every other worker as soon as one fails.
    #[default]
    FailFast,
    /// Let the remaining workers run; the first failure is still reported.
    ContinueOnError,
}

/// A failure inside a node's execution step. Every variant names the node.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Node '{node}' logic failed: {source}")]
    Logic {
        node: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Node '{node}' channel operation failed: {source}")]
    Channel {
        node: String,
        #[source]
        source: ChannelError,
    },

    #[error("Composite node '{node}' finished without a value on inner channel '{channel}'")]
    MissingOutput { node: String, channel: String },

    #[error("Inner pipeline of composite node '{node}' could not start: {source}")]
    InnerSetup {
        node: String,
        #[source]
        source: GraphError,
    },

    #[error("Inner pipeline of composite node '{node}' failed: {source}")]
    InnerPipeline {
        node: String,
        #[source]
        source: Box<ExecutionError>,
    },

    #[error("Worker for node '{node}' panicked: {message}")]
    WorkerPanicked { node: String, message: String },

    #[error(transparent)]
    Setup(#[from] GraphError),
}

impl ExecutionError {
    /// Name of the node that failed, if the error belongs to one.
    pub fn node(&self) -> Option<&str> {
        match self {
            ExecutionError::Logic { node, .. }
            | ExecutionError::Channel { node, .. }
            | ExecutionError::MissingOutput { node, .. }
            | ExecutionError::InnerSetup { node, .. }
            | ExecutionError::InnerPipeline { node, .. }
            | ExecutionError::WorkerPanicked { node, .. } => Some(node),
            ExecutionError::Setup(_) => None,
        }
    }

    /// True when the node stopped only because the run was cancelled.
    pub fn is_cancellation(&self) -> bool {
        match self {
            ExecutionError::Channel {
                source: ChannelError::Cancelled { .. },
                ..
            } => true,
            ExecutionError::InnerPipeline { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}
