// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The pipeline: owner of channels and nodes, and entry point for running them.
//!
//! Construction is incremental and checked at every step: channels are declared by
//! name, nodes are added once every channel they reference is registered here. A
//! pipeline runs once; see [`Pipeline::run`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::channel::Channel;
use crate::config::RunOptions;
use crate::engine::analysis;
use crate::engine::node::Node;
use crate::engine::scheduler::{self, RunHandle, RunReport};
use crate::errors::{ExecutionError, GraphError};
use crate::observability::messages::pipeline::InitialValueSeeded;
use crate::value::{Payload, Value, ValueType};

pub struct Pipeline {
    name: String,
    channels: HashMap<String, Channel>,
    channel_order: Vec<String>,
    nodes: Vec<Arc<Node>>,
    options: RunOptions,
    started: AtomicBool,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, RunOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: RunOptions) -> Self {
        Self {
            name: name.into(),
            channels: HashMap::new(),
            channel_order: Vec::new(),
            nodes: Vec::new(),
            options,
            started: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Register a new channel and return a handle to it. An existing channel with the
    /// same name is left untouched.
    pub fn declare_channel(
        &mut self,
        name: impl Into<String>,
        value_type: ValueType,
    ) -> Result<Channel, GraphError> {
        let name = name.into();
        if self.channels.contains_key(&name) {
            return Err(GraphError::DuplicateChannel {
                pipeline: self.name.clone(),
                channel: name,
            });
        }

        let channel = Channel::new(name.clone(), value_type);
        self.channels.insert(name.clone(), channel.clone());
        self.channel_order.push(name);
        Ok(channel)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Channels in declaration order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channel_order
            .iter()
            .filter_map(|name| self.channels.get(name))
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().map(|node| node.as_ref())
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes().find(|node| node.name() == name)
    }

    /// Register `node`. Every channel it reads or writes must be one declared on this
    /// pipeline; a channel that merely shares a name is rejected too.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node(node.name()).is_some() {
            return Err(GraphError::DuplicateNode {
                pipeline: self.name.clone(),
                node: node.name().to_string(),
            });
        }

        for channel in node.inputs().iter().chain(node.outputs()) {
            let registered = self
                .channels
                .get(channel.name())
                .is_some_and(|known| known.same_channel(channel));
            if !registered {
                return Err(GraphError::UnknownChannel {
                    pipeline: self.name.clone(),
                    channel: channel.name().to_string(),
                    referenced_by: format!("node '{}'", node.name()),
                });
            }
        }

        self.nodes.push(Arc::new(node));
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Everything `run` checks before it touches a channel: every seed names a
    /// declared channel and conforms to its type, and (unless disabled in the run
    /// options) every node can eventually receive all of its inputs.
    pub fn validate(&self, initial: &Payload) -> Result<(), GraphError> {
        for (name, value) in initial {
            let channel = self
                .channels
                .get(name)
                .ok_or_else(|| GraphError::UnknownChannel {
                    pipeline: self.name.clone(),
                    channel: name.clone(),
                    referenced_by: "initial data".to_string(),
                })?;
            channel.check(value)?;
        }

        if self.options.validate_inputs {
            let seeded: HashSet<&str> = initial.keys().map(String::as_str).collect();
            analysis::check_satisfiable(self, &seeded)?;
        }
        Ok(())
    }

    /// Seed `initial` and start one worker per node on the current tokio runtime.
    ///
    /// Returns as soon as the workers are spawned. Either [`RunHandle::wait`] for them
    /// or [`Pipeline::receive`] the values you need; the latter is enough when only an
    /// output matters, but worker failures then go unobserved.
    ///
    /// Nothing is sent if any check fails, and a failed call does not consume the
    /// pipeline's single run.
    pub fn run(&self, initial: Payload) -> Result<RunHandle, GraphError> {
        self.run_with_token(initial, CancellationToken::new())
    }

    pub(crate) fn run_with_token(
        &self,
        initial: Payload,
        cancel: CancellationToken,
    ) -> Result<RunHandle, GraphError> {
        if self.is_started() {
            return Err(GraphError::AlreadyStarted {
                pipeline: self.name.clone(),
            });
        }

        self.validate(&initial)?;

        let runtime = Handle::try_current().map_err(|_| GraphError::NoRuntime {
            pipeline: self.name.clone(),
        })?;

        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GraphError::AlreadyStarted {
                pipeline: self.name.clone(),
            });
        }

        for (name, value) in initial {
            if let Some(channel) = self.channels.get(&name) {
                channel.send(value)?;
                tracing::debug!(
                    "{}",
                    InitialValueSeeded {
                        pipeline: &self.name,
                        channel: &name,
                    }
                );
            }
        }

        Ok(scheduler::spawn_workers(
            &runtime,
            &self.name,
            self.channels.len(),
            &self.nodes,
            &self.options,
            cancel,
        ))
    }

    /// `run` followed by `wait`.
    pub async fn run_to_completion(&self, initial: Payload) -> Result<RunReport, ExecutionError> {
        let handle = self.run(initial)?;
        handle.wait().await
    }

    /// Wait for the next value on the named channel.
    pub async fn receive(&self, channel: &str) -> Result<Value, GraphError> {
        let channel = self
            .channels
            .get(channel)
            .ok_or_else(|| GraphError::UnknownChannel {
                pipeline: self.name.clone(),
                channel: channel.to_string(),
                referenced_by: "receive".to_string(),
            })?;
        Ok(channel.receive().await?)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("channels", &self.channels().collect::<Vec<_>>())
            .field("nodes", &self.nodes)
            .field("options", &self.options)
            .field("started", &self.is_started())
            .finish()
    }
}
