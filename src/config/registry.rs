// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

use crate::traits::{Logic, LogicResult};
use crate::value::Payload;

/// Caller-supplied mapping of logic keys to executable node logic.
///
/// The interpreter resolves every node's `logic` key against this registry and nothing
/// else; keys are plain strings and are never evaluated.
///
/// # Examples
///
/// ```
/// use dagflow::config::LogicRegistry;
/// use dagflow::value::{Payload, Value};
///
/// let mut registry = LogicRegistry::new();
/// registry.register_producer("answer", || {
///     Ok(Payload::from([("out".to_string(), Value::from(42))]))
/// });
/// registry.register_function("echo", |inputs| Ok(inputs));
///
/// assert!(registry.contains_key("answer"));
/// assert_eq!(registry.get("echo").map(|logic| logic.shape()), Some("function"));
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct LogicRegistry(pub HashMap<String, Logic>);

impl LogicRegistry {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Register a zero-argument producer for source nodes.
    pub fn register_producer<F>(&mut self, key: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> LogicResult + Send + Sync + 'static,
    {
        self.insert(key, Logic::producer(f))
    }

    /// Register a mapping function for transform and sink nodes.
    pub fn register_function<F>(&mut self, key: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Payload) -> LogicResult + Send + Sync + 'static,
    {
        self.insert(key, Logic::function(f))
    }

    /// Register `logic` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, logic: Logic) -> &mut Self {
        self.0.insert(key.into(), logic);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Logic> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, Logic>> for LogicRegistry {
    fn from(map: HashMap<String, Logic>) -> Self {
        Self(map)
    }
}

impl fmt::Debug for LogicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.keys().collect();
        keys.sort();
        f.debug_struct("LogicRegistry").field("keys", &keys).finish()
    }
}
