// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for definition loading and interpretation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A definition file was read and parsed.
///
/// # Log Level
/// `debug!`
pub struct DefinitionLoaded<'a> {
    pub path: &'a std::path::Path,
    pub format: &'a str,
}

impl Display for DefinitionLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} pipeline definition from {}",
            self.format,
            self.path.display()
        )
    }
}

/// A definition was turned into a wired pipeline.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DefinitionInterpreted<'a> {
    pub pipeline: &'a str,
    pub channel_count: usize,
    pub node_count: usize,
    pub initial_count: usize,
}

impl Display for DefinitionInterpreted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Interpreted pipeline '{}': {} channels, {} nodes, {} initial values",
            self.pipeline, self.channel_count, self.node_count, self.initial_count
        )
    }
}

impl StructuredLog for DefinitionInterpreted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            channel_count = self.channel_count,
            node_count = self.node_count,
            initial_count = self.initial_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "definition",
            span_name = name,
            pipeline = self.pipeline,
        )
    }
}
