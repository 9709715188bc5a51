// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Nodes: the units of work scheduled by a pipeline.
//!
//! A node is wired to input and output channels and carries one of four bodies:
//!
//! | Kind      | Inputs | Outputs | Body                        |
//! |-----------|--------|---------|-----------------------------|
//! | Source    | none   | 1+      | zero-argument producer      |
//! | Sink      | 1+     | none    | mapping function, result ignored |
//! | Transform | 1+     | 1+      | mapping function            |
//! | Composite | any    | any     | an owned inner [`Pipeline`] |
//!
//! Every node executes once per run: receive one value from each input, invoke its
//! body, publish. Publication is all-or-nothing: every produced value is type-checked
//! before the first send, so a failing node never leaves half of its outputs behind.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::channel::Channel;
use crate::engine::analysis;
use crate::engine::scheduler::panic_message;
use crate::engine::{ExecutionContext, Pipeline};
use crate::errors::{ExecutionError, GraphError};
use crate::observability::messages::node::{
    CompositeEntered, NodeCompleted, NodeStarted, OutputNotProduced, UndeclaredOutput,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Logic, LogicResult, NodeFn, Process, SourceFn};
use crate::value::Payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Source,
    Sink,
    Transform,
    Composite,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Sink => "sink",
            NodeKind::Transform => "transform",
            NodeKind::Composite => "composite",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

enum NodeBody {
    Source(SourceFn),
    Sink(NodeFn),
    Transform(NodeFn),
    Composite(Box<Pipeline>),
}

pub struct Node {
    name: String,
    inputs: Vec<Channel>,
    outputs: Vec<Channel>,
    body: NodeBody,
}

impl Node {
    pub fn source<F>(name: impl Into<String>, outputs: Vec<Channel>, logic: F) -> Result<Self, GraphError>
    where
        F: Fn() -> LogicResult + Send + Sync + 'static,
    {
        Self::build(name.into(), Vec::new(), outputs, NodeBody::Source(Arc::new(logic)))
    }

    pub fn sink<F>(name: impl Into<String>, inputs: Vec<Channel>, logic: F) -> Result<Self, GraphError>
    where
        F: Fn(Payload) -> LogicResult + Send + Sync + 'static,
    {
        Self::build(name.into(), inputs, Vec::new(), NodeBody::Sink(Arc::new(logic)))
    }

    pub fn transform<F>(
        name: impl Into<String>,
        inputs: Vec<Channel>,
        outputs: Vec<Channel>,
        logic: F,
    ) -> Result<Self, GraphError>
    where
        F: Fn(Payload) -> LogicResult + Send + Sync + 'static,
    {
        Self::build(name.into(), inputs, outputs, NodeBody::Transform(Arc::new(logic)))
    }

    /// Build a source, sink or transform from registered logic. The logic's shape must
    /// fit the kind: producers for sources, functions otherwise.
    pub fn from_logic(
        kind: NodeKind,
        name: impl Into<String>,
        inputs: Vec<Channel>,
        outputs: Vec<Channel>,
        logic: Logic,
    ) -> Result<Self, GraphError> {
        let name = name.into();
        let body = match (kind, logic) {
            (NodeKind::Source, Logic::Producer(f)) => NodeBody::Source(f),
            (NodeKind::Sink, Logic::Function(f)) => NodeBody::Sink(f),
            (NodeKind::Transform, Logic::Function(f)) => NodeBody::Transform(f),
            (NodeKind::Composite, _) => {
                return Err(GraphError::InvalidNode {
                    node: name,
                    reason: "composite nodes are built from a pipeline, not logic".to_string(),
                })
            }
            (kind, logic) => {
                return Err(GraphError::InvalidNode {
                    node: name,
                    reason: format!("{} nodes cannot run {} logic", kind, logic.shape()),
                })
            }
        };
        Self::build(name, inputs, outputs, body)
    }

    /// Wrap `inner` as a single node. Outer channels are matched to inner channels by
    /// name: `inputs` must be exactly the channels the inner pipeline consumes without
    /// producing, and every output must be produced (and not consumed) inside.
    pub fn composite(
        name: impl Into<String>,
        inputs: Vec<Channel>,
        outputs: Vec<Channel>,
        inner: Pipeline,
    ) -> Result<Self, GraphError> {
        let name = name.into();
        check_composite_boundary(&name, &inputs, &outputs, &inner)?;
        Self::build(name, inputs, outputs, NodeBody::Composite(Box::new(inner)))
    }

    fn build(
        name: String,
        inputs: Vec<Channel>,
        outputs: Vec<Channel>,
        body: NodeBody,
    ) -> Result<Self, GraphError> {
        let invalid = |reason: &str| GraphError::InvalidNode {
            node: name.clone(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("node name must not be empty"));
        }

        match body {
            NodeBody::Source(_) if !inputs.is_empty() => {
                return Err(invalid("a source node takes no inputs"))
            }
            NodeBody::Source(_) if outputs.is_empty() => {
                return Err(invalid("a source node needs at least one output"))
            }
            NodeBody::Sink(_) if !outputs.is_empty() => {
                return Err(invalid("a sink node has no outputs"))
            }
            NodeBody::Sink(_) if inputs.is_empty() => {
                return Err(invalid("a sink node needs at least one input"))
            }
            NodeBody::Transform(_) if inputs.is_empty() || outputs.is_empty() => {
                return Err(invalid("a transform node needs at least one input and one output"))
            }
            _ => {}
        }

        if let Some(duplicate) = first_duplicate(&inputs) {
            return Err(invalid(&format!("input channel '{}' is listed twice", duplicate)));
        }
        if let Some(duplicate) = first_duplicate(&outputs) {
            return Err(invalid(&format!("output channel '{}' is listed twice", duplicate)));
        }
        if let Some(looped) = inputs
            .iter()
            .find(|input| outputs.iter().any(|output| output.name() == input.name()))
        {
            return Err(invalid(&format!(
                "channel '{}' is both an input and an output",
                looped.name()
            )));
        }

        Ok(Self {
            name,
            inputs,
            outputs,
            body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Source(_) => NodeKind::Source,
            NodeBody::Sink(_) => NodeKind::Sink,
            NodeBody::Transform(_) => NodeKind::Transform,
            NodeBody::Composite(_) => NodeKind::Composite,
        }
    }

    pub fn inputs(&self) -> &[Channel] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Channel] {
        &self.outputs
    }

    /// The wrapped pipeline of a composite node.
    pub fn inner_pipeline(&self) -> Option<&Pipeline> {
        match &self.body {
            NodeBody::Composite(inner) => Some(inner),
            _ => None,
        }
    }

    async fn gather_inputs(&self, ctx: &ExecutionContext) -> Result<Payload, ExecutionError> {
        let mut inputs = Payload::with_capacity(self.inputs.len());
        for channel in &self.inputs {
            let value = ctx
                .receive(channel)
                .await
                .map_err(|source| ExecutionError::Channel {
                    node: self.name.clone(),
                    source,
                })?;
            inputs.insert(channel.name().to_string(), value);
        }
        Ok(inputs)
    }

    async fn invoke<F>(&self, call: F) -> Result<Payload, ExecutionError>
    where
        F: FnOnce() -> LogicResult + Send + 'static,
    {
        match tokio::task::spawn_blocking(call).await {
            Ok(Ok(produced)) => Ok(produced),
            Ok(Err(source)) => Err(ExecutionError::Logic {
                node: self.name.clone(),
                source,
            }),
            Err(join_error) => Err(ExecutionError::WorkerPanicked {
                node: self.name.clone(),
                message: panic_message(join_error),
            }),
        }
    }

    async fn run_composite(
        &self,
        inner: &Pipeline,
        inputs: Payload,
        ctx: &ExecutionContext,
    ) -> Result<Payload, ExecutionError> {
        tracing::debug!(
            "{}",
            CompositeEntered {
                node: &self.name,
                inner_pipeline: inner.name(),
            }
        );

        let handle = inner
            .run_with_token(inputs, ctx.cancellation_token().child_token())
            .map_err(|source| ExecutionError::InnerSetup {
                node: self.name.clone(),
                source,
            })?;
        handle
            .wait()
            .await
            .map_err(|source| ExecutionError::InnerPipeline {
                node: self.name.clone(),
                source: Box::new(source),
            })?;

        let mut produced = Payload::with_capacity(self.outputs.len());
        for output in &self.outputs {
            let value = inner
                .channel(output.name())
                .and_then(Channel::try_receive)
                .ok_or_else(|| ExecutionError::MissingOutput {
                    node: self.name.clone(),
                    channel: output.name().to_string(),
                })?;
            produced.insert(output.name().to_string(), value);
        }
        Ok(produced)
    }

    /// Send every produced value to its output channel, or nothing at all if any value
    /// fails its channel's type check. Returns the number of values sent.
    fn publish(&self, mut produced: Payload) -> Result<usize, ExecutionError> {
        let mut ready = Vec::with_capacity(self.outputs.len());
        for channel in &self.outputs {
            match produced.remove(channel.name()) {
                Some(value) => {
                    channel
                        .check(&value)
                        .map_err(|source| ExecutionError::Channel {
                            node: self.name.clone(),
                            source,
                        })?;
                    ready.push((channel, value));
                }
                None => tracing::warn!(
                    "{}",
                    OutputNotProduced {
                        node: &self.name,
                        channel: channel.name(),
                    }
                ),
            }
        }

        for key in produced.keys() {
            tracing::warn!(
                "{}",
                UndeclaredOutput {
                    node: &self.name,
                    key,
                }
            );
        }

        let count = ready.len();
        for (channel, value) in ready {
            channel
                .send(value)
                .map_err(|source| ExecutionError::Channel {
                    node: self.name.clone(),
                    source,
                })?;
        }
        Ok(count)
    }
}

#[async_trait]
impl Process for Node {
    async fn process(&self, ctx: &ExecutionContext) -> Result<(), ExecutionError> {
        let started_at = Instant::now();
        let kind = self.kind();
        NodeStarted {
            node: &self.name,
            kind: kind.name(),
            input_count: self.inputs.len(),
        }
        .log();

        let inputs = self.gather_inputs(ctx).await?;

        let produced = match &self.body {
            NodeBody::Source(logic) => {
                let logic = Arc::clone(logic);
                self.invoke(move || logic()).await?
            }
            NodeBody::Transform(logic) => {
                let logic = Arc::clone(logic);
                self.invoke(move || logic(inputs)).await?
            }
            NodeBody::Sink(logic) => {
                let logic = Arc::clone(logic);
                self.invoke(move || logic(inputs)).await?;
                Payload::new()
            }
            NodeBody::Composite(inner) => self.run_composite(inner, inputs, ctx).await?,
        };

        let published = self.publish(produced)?;

        tracing::debug!(
            "{}",
            NodeCompleted {
                node: &self.name,
                kind: kind.name(),
                published,
                duration: started_at.elapsed(),
            }
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("inputs", &self.inputs.iter().map(Channel::name).collect::<Vec<_>>())
            .field("outputs", &self.outputs.iter().map(Channel::name).collect::<Vec<_>>())
            .finish()
    }
}

fn first_duplicate(channels: &[Channel]) -> Option<&str> {
    let mut seen = HashSet::new();
    channels
        .iter()
        .map(Channel::name)
        .find(|name| !seen.insert(*name))
}

fn check_composite_boundary(
    node: &str,
    inputs: &[Channel],
    outputs: &[Channel],
    inner: &Pipeline,
) -> Result<(), GraphError> {
    let mismatch = |reason: String| GraphError::CompositeMismatch {
        node: node.to_string(),
        reason,
    };

    if inner.is_started() {
        return Err(mismatch(format!(
            "inner pipeline '{}' has already been run",
            inner.name()
        )));
    }

    let expected = analysis::boundary_inputs(inner);
    let declared: BTreeSet<String> = inputs.iter().map(|c| c.name().to_string()).collect();
    if expected != declared {
        let missing: Vec<&String> = expected.difference(&declared).collect();
        let extra: Vec<&String> = declared.difference(&expected).collect();
        return Err(mismatch(format!(
            "inner pipeline '{}' expects inputs {:?}; missing {:?}, unexpected {:?}",
            inner.name(),
            expected,
            missing,
            extra
        )));
    }

    let produced = analysis::produced_channels(inner);
    let consumed = analysis::consumed_channels(inner);
    for output in outputs {
        if !produced.contains(output.name()) {
            return Err(mismatch(format!(
                "output '{}' is not produced inside '{}'",
                output.name(),
                inner.name()
            )));
        }
        if consumed.contains(output.name()) {
            return Err(mismatch(format!(
                "output '{}' is consumed inside '{}' and would never reach the outer pipeline",
                output.name(),
                inner.name()
            )));
        }
    }

    for outer in inputs.iter().chain(outputs) {
        // both sets above come from inner nodes, so the channel is declared
        if let Some(inner_channel) = inner.channel(outer.name()) {
            if inner_channel.value_type() != outer.value_type() {
                return Err(mismatch(format!(
                    "channel '{}' is {} outside but {} inside",
                    outer.name(),
                    outer.value_type(),
                    inner_channel.value_type()
                )));
            }
        }
    }

    let seeded: HashSet<&str> = inputs.iter().map(Channel::name).collect();
    analysis::check_satisfiable(inner, &seeded).map_err(|e| mismatch(e.to_string()))
}
