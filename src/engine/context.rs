// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::channel::Channel;
use crate::errors::ChannelError;
use crate::value::Value;

/// Per-run state handed to every worker: the run's cancellation token and the
/// optional bound on how long a single receive may wait.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    cancel: CancellationToken,
    receive_timeout: Option<Duration>,
}

impl ExecutionContext {
    pub fn new(cancel: CancellationToken, receive_timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            receive_timeout,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout
    }

    /// Receive from `channel`, giving up on cancellation or when the timeout elapses.
    pub async fn receive(&self, channel: &Channel) -> Result<Value, ChannelError> {
        match self.receive_timeout {
            Some(timeout) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(ChannelError::Cancelled {
                        channel: channel.name().to_string(),
                    }),
                    result = channel.receive_timeout(timeout) => result,
                }
            }
            None => channel.receive_cancellable(&self.cancel).await,
        }
    }
}
