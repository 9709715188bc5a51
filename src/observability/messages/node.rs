// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node execution events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A node's worker began its execution step.
///
/// # Log Level
/// `debug!`
pub struct NodeStarted<'a> {
    pub node: &'a str,
    pub kind: &'a str,
    pub input_count: usize,
}

impl Display for NodeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} node '{}' started: waiting on {} inputs",
            self.kind, self.node, self.input_count
        )
    }
}

impl StructuredLog for NodeStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            kind = self.kind,
            input_count = self.input_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node",
            span_name = name,
            node = self.node,
            kind = self.kind,
        )
    }
}

/// A node finished and published its outputs.
///
/// # Log Level
/// `debug!`
pub struct NodeCompleted<'a> {
    pub node: &'a str,
    pub kind: &'a str,
    pub published: usize,
    pub duration: std::time::Duration,
}

impl Display for NodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} node '{}' completed: published {} values in {:?}",
            self.kind, self.node, self.published, self.duration
        )
    }
}

/// A node failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeFailed<'a> {
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' failed: {}", self.node, self.error)
    }
}

/// Logic returned no value for a declared output; downstream readers of that
/// channel will wait.
///
/// # Log Level
/// `warn!`
pub struct OutputNotProduced<'a> {
    pub node: &'a str,
    pub channel: &'a str,
}

impl Display for OutputNotProduced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' produced no value for output channel '{}'",
            self.node, self.channel
        )
    }
}

/// Logic returned a key that is not one of the node's outputs. The value is dropped.
///
/// # Log Level
/// `warn!`
pub struct UndeclaredOutput<'a> {
    pub node: &'a str,
    pub key: &'a str,
}

impl Display for UndeclaredOutput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' returned '{}' which is not one of its outputs; dropping it",
            self.node, self.key
        )
    }
}

/// A composite node is about to run its inner pipeline.
///
/// # Log Level
/// `debug!`
pub struct CompositeEntered<'a> {
    pub node: &'a str,
    pub inner_pipeline: &'a str,
}

impl Display for CompositeEntered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Composite node '{}' running inner pipeline '{}'",
            self.node, self.inner_pipeline
        )
    }
}
