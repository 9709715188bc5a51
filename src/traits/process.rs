// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::ExecutionContext;
use crate::errors::ExecutionError;

/// The single execution step a scheduler worker runs for a unit of work.
#[async_trait]
pub trait Process: Send + Sync {
    /// Receive inputs, run logic, publish outputs. Runs exactly once per pipeline run.
    async fn process(&self, ctx: &ExecutionContext) -> Result<(), ExecutionError>;

    fn name(&self) -> &str;
}
