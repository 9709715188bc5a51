// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use thiserror::Error;

use crate::value::ValueType;

/// Errors raised by a single channel operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// The value does not conform to the channel's declared type. Nothing was enqueued.
    #[error("Channel '{channel}' expects data of type {expected}, but got {actual}")]
    TypeMismatch {
        channel: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Receive on channel '{channel}' was cancelled")]
    Cancelled { channel: String },

    #[error("No value arrived on channel '{channel}' within {timeout:?}")]
    Timeout { channel: String, timeout: Duration },

    #[error("Channel '{channel}' is closed")]
    Closed { channel: String },
}
