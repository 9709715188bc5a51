// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Call shapes for caller-supplied node logic.
//!
//! Logic is opaque to the engine: it is handed a [`Payload`] keyed by input channel
//! name and returns one keyed by output channel name. Logic runs on tokio's blocking
//! pool, so it may do CPU-heavy or blocking work.

use std::fmt;
use std::sync::Arc;

use crate::value::Payload;

pub type LogicResult = anyhow::Result<Payload>;

/// Zero-argument producer used by source nodes.
pub type SourceFn = Arc<dyn Fn() -> LogicResult + Send + Sync>;

/// Mapping-to-mapping function used by transform and sink nodes. Sinks ignore the result.
pub type NodeFn = Arc<dyn Fn(Payload) -> LogicResult + Send + Sync>;

/// A registered piece of logic in one of the two supported shapes.
#[derive(Clone)]
pub enum Logic {
    Producer(SourceFn),
    Function(NodeFn),
}

impl Logic {
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> LogicResult + Send + Sync + 'static,
    {
        Logic::Producer(Arc::new(f))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Payload) -> LogicResult + Send + Sync + 'static,
    {
        Logic::Function(Arc::new(f))
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Logic::Producer(_) => "producer",
            Logic::Function(_) => "function",
        }
    }
}

impl fmt::Debug for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Logic::{}", self.shape())
    }
}
