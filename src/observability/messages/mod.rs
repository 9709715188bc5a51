// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `pipeline` - run lifecycle: seeding, start, completion, failure
//! * `node` - per-node execution events
//! * `interpreter` - definition loading and interpretation
//!
//! # Usage Pattern
//!
//! ```rust
//! use dagflow::observability::messages::{pipeline::PipelineStarted, StructuredLog};
//!
//! let msg = PipelineStarted {
//!     pipeline: "ExamplePipeline",
//!     node_count: 2,
//!     channel_count: 4,
//! };
//!
//! msg.log();
//! ```

pub mod interpreter;
pub mod node;
pub mod pipeline;

use tracing::Span;

/// Emit a message with structured fields, or open a span carrying the same fields.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}
