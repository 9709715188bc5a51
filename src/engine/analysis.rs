// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Static analysis over a pipeline's wiring.
//!
//! Nodes run exactly once and each receive takes one value, so whether a run can
//! finish is decidable before any worker starts. [`check_satisfiable`] plays the run
//! out on value counts instead of values:
//!
//! ```text
//! supply[c]  = values already queued on c + (1 if c is seeded)
//! pending[c] = receive slots on c held by unfired nodes
//! repeat:
//!     pick an unfired node where supply[input] >= pending[input] for every input
//!     supply[input] -= 1, pending[input] -= 1, supply[output] += 1
//! until nothing changes
//! ```
//!
//! Readers of a shared channel race for its values, and a reader that wins one may then
//! block on another input while holding it. Requiring a channel to cover every pending
//! reader before any of them fires means a value that only appears after one of its own
//! readers has run is never counted on. Any node left unfired could block forever on
//! the reported input. This catches missing initial data, cyclic waits and shared
//! channels whose values can be taken by the wrong reader.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::engine::node::Node;
use crate::engine::Pipeline;
use crate::errors::GraphError;

/// Channels read by some node but written by none. For a composite, these are
/// the values the outer pipeline has to supply.
pub fn boundary_inputs(pipeline: &Pipeline) -> BTreeSet<String> {
    let produced = produced_channels(pipeline);
    consumed_channels(pipeline)
        .into_iter()
        .filter(|name| !produced.contains(name))
        .collect()
}

/// Channels written by at least one node.
pub fn produced_channels(pipeline: &Pipeline) -> HashSet<String> {
    pipeline
        .nodes()
        .flat_map(Node::outputs)
        .map(|channel| channel.name().to_string())
        .collect()
}

/// Channels read by at least one node.
pub fn consumed_channels(pipeline: &Pipeline) -> HashSet<String> {
    pipeline
        .nodes()
        .flat_map(Node::inputs)
        .map(|channel| channel.name().to_string())
        .collect()
}

/// Fail with `UnsatisfiableInput` for the first node (in registration order) that is
/// not guaranteed to receive all of its inputs, given the values already queued plus
/// one value for each name in `seeded`.
pub fn check_satisfiable(pipeline: &Pipeline, seeded: &HashSet<&str>) -> Result<(), GraphError> {
    let mut supply: HashMap<&str, usize> = pipeline
        .channels()
        .map(|channel| {
            let seed = usize::from(seeded.contains(channel.name()));
            (channel.name(), channel.len() + seed)
        })
        .collect();

    let nodes: Vec<&Node> = pipeline.nodes().collect();
    let mut pending: HashMap<&str, usize> = HashMap::new();
    for input in nodes.iter().flat_map(|node| node.inputs()) {
        *pending.entry(input.name()).or_insert(0) += 1;
    }
    let mut fired = vec![false; nodes.len()];

    loop {
        let mut progressed = false;
        for (index, node) in nodes.iter().enumerate() {
            if fired[index] || first_uncovered(node, &supply, &pending).is_some() {
                continue;
            }

            for input in node.inputs() {
                if let Some(count) = supply.get_mut(input.name()) {
                    *count -= 1;
                }
                if let Some(count) = pending.get_mut(input.name()) {
                    *count -= 1;
                }
            }
            for output in node.outputs() {
                *supply.entry(output.name()).or_insert(0) += 1;
            }
            fired[index] = true;
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    for (index, node) in nodes.iter().enumerate() {
        if fired[index] {
            continue;
        }
        if let Some(channel) = first_uncovered(node, &supply, &pending) {
            return Err(GraphError::UnsatisfiableInput {
                node: node.name().to_string(),
                channel: channel.to_string(),
            });
        }
    }
    Ok(())
}

/// First input of `node` whose supply cannot cover every reader still waiting on it.
fn first_uncovered<'a>(
    node: &'a Node,
    supply: &HashMap<&str, usize>,
    pending: &HashMap<&str, usize>,
) -> Option<&'a str> {
    node.inputs()
        .iter()
        .map(|input| input.name())
        .find(|name| {
            let available = supply.get(name).copied().unwrap_or(0);
            let waiting = pending.get(name).copied().unwrap_or(0).max(1);
            available < waiting
        })
}
