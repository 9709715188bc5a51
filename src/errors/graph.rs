// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Construction-time errors for pipelines and nodes.

use thiserror::Error;

use crate::errors::ChannelError;

/// Errors raised while building or starting a pipeline. A failed call leaves the
/// pipeline exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Channel '{channel}' is already declared in pipeline '{pipeline}'")]
    DuplicateChannel { pipeline: String, channel: String },

    /// `referenced_by` names the node, initial data, or composite that holds the reference.
    #[error("Channel '{channel}' referenced by {referenced_by} is not declared in pipeline '{pipeline}'")]
    UnknownChannel {
        pipeline: String,
        channel: String,
        referenced_by: String,
    },

    #[error("Node '{node}' is already registered in pipeline '{pipeline}'")]
    DuplicateNode { pipeline: String, node: String },

    #[error("Node '{node}' is invalid: {reason}")]
    InvalidNode { node: String, reason: String },

    #[error("Composite node '{node}' does not match its inner pipeline: {reason}")]
    CompositeMismatch { node: String, reason: String },

    /// Static analysis found a node that can never receive all of its inputs.
    #[error("Node '{node}' can never run: channel '{channel}' has no value to deliver to it")]
    UnsatisfiableInput { node: String, channel: String },

    #[error("Pipeline '{pipeline}' has already been run")]
    AlreadyStarted { pipeline: String },

    #[error("Pipeline '{pipeline}' must be run from within a tokio runtime")]
    NoRuntime { pipeline: String },

    #[error(transparent)]
    Channel(#[from] ChannelError),
}
