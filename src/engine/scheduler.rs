// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One-task-per-node scheduler.
//!
//! Every node gets its own tokio task, started together. Ordering between nodes comes
//! only from channel availability. Each worker reports its outcome on an internal
//! completion channel; [`RunHandle::wait`] drains it and joins every task, so no
//! failure (including a panic) goes unreported.
//!
//! ```text
//! run() ──spawn──► worker(node A) ──outcome──┐
//!       ──spawn──► worker(node B) ──outcome──┼──► RunHandle::wait ──► RunReport | first error
//!       ──spawn──► worker(node C) ──outcome──┘
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::RunOptions;
use crate::engine::node::Node;
use crate::engine::ExecutionContext;
use crate::errors::{ExecutionError, FailureStrategy};
use crate::observability::messages::node::{NodeFailed, NodeStarted};
use crate::observability::messages::pipeline::{
    PipelineCompleted, PipelineFailed, PipelineStarted, RunCancelled,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Process;

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub pipeline: String,
    /// Node names in the order their workers finished.
    pub completed: Vec<String>,
    pub duration: Duration,
}

struct WorkerOutcome {
    node: String,
    result: Result<(), ExecutionError>,
}

/// Handle to a started run.
///
/// Dropping the handle detaches the workers; they keep running and their outputs can
/// still be received from the pipeline's channels.
pub struct RunHandle {
    pipeline: String,
    workers: Vec<(String, JoinHandle<()>)>,
    completions: mpsc::UnboundedReceiver<WorkerOutcome>,
    cancel: CancellationToken,
    failure_strategy: FailureStrategy,
    started_at: Instant,
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let workers: Vec<&str> = self.workers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("RunHandle")
            .field("pipeline", &self.pipeline)
            .field("workers", &workers)
            .field("failure_strategy", &self.failure_strategy)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

pub(crate) fn spawn_workers(
    runtime: &Handle,
    pipeline: &str,
    channel_count: usize,
    nodes: &[Arc<Node>],
    options: &RunOptions,
    cancel: CancellationToken,
) -> RunHandle {
    let started = PipelineStarted {
        pipeline,
        node_count: nodes.len(),
        channel_count,
    };
    started.log();
    let pipeline_span = started.span("run");

    let (tx, completions) = mpsc::unbounded_channel();
    let ctx = ExecutionContext::new(cancel.clone(), options.receive_timeout);

    let workers = nodes
        .iter()
        .map(|node| {
            let node = Arc::clone(node);
            let ctx = ctx.clone();
            let tx = tx.clone();
            let span = NodeStarted {
                node: node.name(),
                kind: node.kind().name(),
                input_count: node.inputs().len(),
            }
            .span("worker");
            span.follows_from(&pipeline_span);

            let name = node.name().to_string();
            let handle = runtime.spawn(
                async move {
                    let result = node.process(&ctx).await;
                    // receiver gone means nobody is waiting on this run
                    let _ = tx.send(WorkerOutcome {
                        node: node.name().to_string(),
                        result,
                    });
                }
                .instrument(span),
            );
            (name, handle)
        })
        .collect();

    RunHandle {
        pipeline: pipeline.to_string(),
        workers,
        completions,
        cancel,
        failure_strategy: options.failure_strategy,
        started_at: Instant::now(),
    }
}

impl RunHandle {
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Cancel the run. Workers waiting on a channel stop with a cancellation error;
    /// logic that is already executing runs to completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run, usable after the handle has been moved into `wait`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.workers.iter().all(|(_, handle)| handle.is_finished())
    }

    /// Join every worker. Returns the first failure in completion order, after all
    /// workers have stopped.
    pub async fn wait(mut self) -> Result<RunReport, ExecutionError> {
        let node_count = self.workers.len();
        let mut completed = Vec::with_capacity(node_count);
        let mut first_failure = None;

        while let Some(outcome) = self.completions.recv().await {
            match outcome.result {
                Ok(()) => completed.push(outcome.node),
                Err(error) => self.record_failure(&outcome.node, error, &mut first_failure),
            }
        }

        // the completion channel closes once every worker has reported or panicked
        let workers = std::mem::take(&mut self.workers);
        for (node, handle) in workers {
            if let Err(join_error) = handle.await {
                let error = ExecutionError::WorkerPanicked {
                    message: panic_message(join_error),
                    node: node.clone(),
                };
                self.record_failure(&node, error, &mut first_failure);
            }
        }

        match first_failure {
            Some(error) => {
                PipelineFailed {
                    pipeline: &self.pipeline,
                    error: &error,
                }
                .log();
                Err(error)
            }
            None => {
                let duration = self.started_at.elapsed();
                PipelineCompleted {
                    pipeline: &self.pipeline,
                    node_count,
                    duration,
                }
                .log();
                Ok(RunReport {
                    pipeline: self.pipeline.clone(),
                    completed,
                    duration,
                })
            }
        }
    }

    fn record_failure(
        &self,
        node: &str,
        error: ExecutionError,
        first_failure: &mut Option<ExecutionError>,
    ) {
        if first_failure.is_some() && error.is_cancellation() {
            tracing::debug!("{}", NodeFailed { node, error: &error });
            return;
        }

        tracing::error!("{}", NodeFailed { node, error: &error });

        if first_failure.is_none() {
            if self.failure_strategy == FailureStrategy::FailFast && !self.cancel.is_cancelled() {
                tracing::warn!(
                    "{}",
                    RunCancelled {
                        pipeline: &self.pipeline,
                        failed_node: node,
                    }
                );
                self.cancel.cancel();
            }
            *first_failure = Some(error);
        }
    }
}

pub(crate) fn panic_message(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return "task was cancelled".to_string();
    }

    let payload = join_error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
