// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod channel;       // typed FIFO channels
pub mod config;        // definitions, registry, interpreter, run options
pub mod engine;        // nodes, pipelines, scheduler
pub mod errors;        // error handling
pub mod observability;
pub mod traits;        // node logic call shapes
pub mod value;         // values and semantic types

#[cfg(test)]
mod stub;
