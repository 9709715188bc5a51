// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed FIFO conduit between nodes.
//!
//! A [`Channel`] is a cheap handle: clones refer to the same underlying queue. The
//! queue is unbounded, so `send` never waits; `receive` suspends the calling task
//! until a value is pending. A counting semaphore tracks pending values so that each
//! acquired permit corresponds to exactly one queued value.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::errors::ChannelError;
use crate::value::{Value, ValueType};

#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    name: String,
    value_type: ValueType,
    queue: Mutex<VecDeque<Value>>,
    available: Semaphore,
}

impl Channel {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                name: name.into(),
                value_type,
                queue: Mutex::new(VecDeque::new()),
                available: Semaphore::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn value_type(&self) -> ValueType {
        self.inner.value_type
    }

    /// Enqueue `value`, checking it against the declared type first.
    pub fn send(&self, value: Value) -> Result<(), ChannelError> {
        self.check(&value)?;
        self.queue().push_back(value);
        self.inner.available.add_permits(1);
        Ok(())
    }

    /// Fails with `TypeMismatch` if `value` would be rejected by [`Channel::send`].
    pub fn check(&self, value: &Value) -> Result<(), ChannelError> {
        if self.inner.value_type.accepts(value) {
            Ok(())
        } else {
            Err(ChannelError::TypeMismatch {
                channel: self.inner.name.clone(),
                expected: self.inner.value_type,
                actual: value.value_type(),
            })
        }
    }

    /// Wait for the oldest pending value and take it. Waits forever if nothing is
    /// ever sent.
    pub async fn receive(&self) -> Result<Value, ChannelError> {
        let permit = self
            .inner
            .available
            .acquire()
            .await
            .map_err(|_| ChannelError::Closed {
                channel: self.inner.name.clone(),
            })?;
        permit.forget();
        self.pop()
    }

    pub async fn receive_timeout(&self, timeout: Duration) -> Result<Value, ChannelError> {
        match tokio::time::timeout(timeout, self.receive()).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout {
                channel: self.inner.name.clone(),
                timeout,
            }),
        }
    }

    pub async fn receive_cancellable(
        &self,
        token: &CancellationToken,
    ) -> Result<Value, ChannelError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ChannelError::Cancelled {
                channel: self.inner.name.clone(),
            }),
            result = self.receive() => result,
        }
    }

    /// Take the oldest pending value without waiting.
    pub fn try_receive(&self) -> Option<Value> {
        let permit = self.inner.available.try_acquire().ok()?;
        permit.forget();
        self.pop().ok()
    }

    /// Diagnostic only: racy under concurrent senders.
    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Diagnostic only: racy under concurrent senders.
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    /// True when both handles refer to the same underlying channel.
    pub fn same_channel(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Value>> {
        self.inner.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Only called while holding a forgotten permit, so a value is always queued.
    fn pop(&self) -> Result<Value, ChannelError> {
        self.queue().pop_front().ok_or_else(|| ChannelError::Closed {
            channel: self.inner.name.clone(),
        })
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.inner.name)
            .field("value_type", &self.inner.value_type)
            .field("pending", &self.len())
            .finish()
    }
}
