// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Canned node logic shared by unit and integration tests.

use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::engine::{Node, Pipeline};
use crate::traits::LogicResult;
use crate::value::{Payload, Value, ValueType};

/// Echoes its inputs back as outputs.
pub fn identity(inputs: Payload) -> LogicResult {
    Ok(inputs)
}

fn integer(inputs: &Payload, key: &str) -> anyhow::Result<i64> {
    inputs
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("input '{}' is missing or not an integer", key))
}

/// `{out: a + b}` over two integer inputs.
pub fn sum_of(
    a: &'static str,
    b: &'static str,
    out: &'static str,
) -> impl Fn(Payload) -> LogicResult + Send + Sync + 'static {
    move |inputs| {
        let total = integer(&inputs, a)? + integer(&inputs, b)?;
        Ok(Payload::from([(out.to_string(), Value::from(total))]))
    }
}

/// `{out: value * factor}` over two integer inputs.
pub fn product_of(
    value: &'static str,
    factor: &'static str,
    out: &'static str,
) -> impl Fn(Payload) -> LogicResult + Send + Sync + 'static {
    move |inputs| {
        let product = integer(&inputs, value)? * integer(&inputs, factor)?;
        Ok(Payload::from([(out.to_string(), Value::from(product))]))
    }
}

/// Pushes every payload it sees into `seen` and returns nothing.
pub fn recorder(
    seen: Arc<Mutex<Vec<Payload>>>,
) -> impl Fn(Payload) -> LogicResult + Send + Sync + 'static {
    move |inputs| {
        seen.lock()
            .map_err(|_| anyhow!("recorder lock poisoned"))?
            .push(inputs);
        Ok(Payload::new())
    }
}

/// `{to: inputs[from]}`, passing a single value through under a new name.
pub fn rename(
    from: &'static str,
    to: &'static str,
) -> impl Fn(Payload) -> LogicResult + Send + Sync + 'static {
    move |mut inputs| {
        let value = inputs
            .remove(from)
            .ok_or_else(|| anyhow!("input '{}' is missing", from))?;
        Ok(Payload::from([(to.to_string(), value)]))
    }
}

pub fn failing(message: &'static str) -> impl Fn(Payload) -> LogicResult + Send + Sync + 'static {
    move |_| Err(anyhow!(message))
}

/// input1, input2 -> [Summator] -> sum; sum, multiplier -> [Multiplier] -> output
pub fn sum_then_multiply_pipeline() -> Pipeline {
    let mut inner = Pipeline::new("SumThenMultiply");
    let input1 = inner.declare_channel("input1", ValueType::Integer).unwrap();
    let input2 = inner.declare_channel("input2", ValueType::Integer).unwrap();
    let multiplier = inner.declare_channel("multiplier", ValueType::Integer).unwrap();
    let sum = inner.declare_channel("sum", ValueType::Integer).unwrap();
    let output = inner.declare_channel("output", ValueType::Integer).unwrap();

    inner
        .add_node(
            Node::transform(
                "Summator",
                vec![input1, input2],
                vec![sum.clone()],
                sum_of("input1", "input2", "sum"),
            )
            .unwrap(),
        )
        .unwrap();
    inner
        .add_node(
            Node::transform(
                "Multiplier",
                vec![sum, multiplier],
                vec![output],
                product_of("sum", "multiplier", "output"),
            )
            .unwrap(),
        )
        .unwrap();
    inner
}
