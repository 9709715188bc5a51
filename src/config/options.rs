// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::errors::FailureStrategy;

/// Options controlling a single pipeline run.
///
/// # Fields
/// * `failure_strategy` - whether the first failing node cancels the rest (defaults to FailFast)
/// * `receive_timeout` - upper bound on any single input wait; `None` waits forever
/// * `validate_inputs` - run static satisfiability analysis before spawning workers
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub failure_strategy: FailureStrategy,
    pub receive_timeout: Option<Duration>,
    pub validate_inputs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            failure_strategy: FailureStrategy::default(),
            receive_timeout: None,
            validate_inputs: true,
        }
    }
}

impl RunOptions {
    pub fn with_failure_strategy(mut self, failure_strategy: FailureStrategy) -> Self {
        self.failure_strategy = failure_strategy;
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = Some(timeout);
        self
    }

    /// Skip static analysis; a node whose inputs never arrive then waits until the
    /// receive timeout, or forever without one.
    pub fn without_input_validation(mut self) -> Self {
        self.validate_inputs = false;
        self
    }
}
