// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod channel;
mod definition;
mod execution;
mod graph;

pub use channel::ChannelError;
pub use definition::DefinitionError;
pub use execution::{ExecutionError, FailureStrategy};
pub use graph::GraphError;
