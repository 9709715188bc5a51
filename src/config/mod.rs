// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod definition;
mod interpreter;
mod loader;
mod options;
mod registry;

#[cfg(test)]
mod integration_tests;

pub use definition::{
    ChannelDefinition, DefinitionDocument, Literal, NodeDefinition, OptionsDefinition,
    PipelineDefinition,
};
pub use interpreter::DslInterpreter;
pub use loader::{load_definition, parse_definition, DefinitionFormat};
pub use options::RunOptions;
pub use registry::LogicRegistry;
