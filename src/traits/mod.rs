// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod logic;
pub mod process;

pub use logic::{Logic, LogicResult, NodeFn, SourceFn};
pub use process::Process;
