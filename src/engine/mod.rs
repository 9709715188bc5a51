// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod analysis;
mod context;
pub mod node;
pub mod pipeline;
pub mod scheduler;

pub use context::ExecutionContext;
pub use node::{Node, NodeKind};
pub use pipeline::Pipeline;
pub use scheduler::{RunHandle, RunReport};
