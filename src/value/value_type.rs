// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::value::Value;

/// Semantic type tag declared by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Accepts every value.
    Any,
    Integer,
    Float,
    Text,
    Boolean,
    Sequence,
    Mapping,
    Bytes,
}

/// Recognized type names for declarative definitions. Lookup is case-insensitive;
/// anything not listed here is rejected.
pub const TYPE_NAMES: &[(&str, ValueType)] = &[
    ("any", ValueType::Any),
    ("object", ValueType::Any),
    ("integer", ValueType::Integer),
    ("int", ValueType::Integer),
    ("i64", ValueType::Integer),
    ("float", ValueType::Float),
    ("double", ValueType::Float),
    ("f64", ValueType::Float),
    ("text", ValueType::Text),
    ("string", ValueType::Text),
    ("str", ValueType::Text),
    ("boolean", ValueType::Boolean),
    ("bool", ValueType::Boolean),
    ("sequence", ValueType::Sequence),
    ("list", ValueType::Sequence),
    ("array", ValueType::Sequence),
    ("mapping", ValueType::Mapping),
    ("map", ValueType::Mapping),
    ("dict", ValueType::Mapping),
    ("bytes", ValueType::Bytes),
    ("binary", ValueType::Bytes),
    ("buffer", ValueType::Bytes),
];

impl ValueType {
    /// Conformance predicate: exact tag match, or `Any`.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueType::Any => true,
            expected => *expected == value.value_type(),
        }
    }

    /// Resolve a declared type name against [`TYPE_NAMES`].
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        TYPE_NAMES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(wanted))
            .map(|(_, value_type)| *value_type)
    }

    /// Canonical name, the first entry for this tag in [`TYPE_NAMES`].
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Any => "any",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Text => "text",
            ValueType::Boolean => "boolean",
            ValueType::Sequence => "sequence",
            ValueType::Mapping => "mapping",
            ValueType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact_tags_only() {
        struct TestCase {
            name: &'static str,
            declared: ValueType,
            value: Value,
            expected: bool,
        }

        let test_cases = vec![
            TestCase { name: "integer ok", declared: ValueType::Integer, value: Value::from(3), expected: true },
            TestCase { name: "integer rejects float", declared: ValueType::Integer, value: Value::from(3.0), expected: false },
            TestCase { name: "float rejects integer", declared: ValueType::Float, value: Value::from(3), expected: false },
            TestCase { name: "text rejects integer", declared: ValueType::Text, value: Value::from(3), expected: false },
            TestCase { name: "sequence ok", declared: ValueType::Sequence, value: Value::from(vec![Value::from(1)]), expected: true },
            TestCase { name: "bytes rejects sequence", declared: ValueType::Bytes, value: Value::from(vec![Value::from(1)]), expected: false },
            TestCase { name: "any takes text", declared: ValueType::Any, value: Value::from("x"), expected: true },
            TestCase { name: "any takes bytes", declared: ValueType::Any, value: Value::from(vec![1u8]), expected: true },
        ];

        for case in test_cases {
            assert_eq!(case.declared.accepts(&case.value), case.expected, "{}", case.name);
        }
    }

    #[test]
    fn test_from_name_is_case_insensitive_and_closed() {
        assert_eq!(ValueType::from_name("Integer"), Some(ValueType::Integer));
        assert_eq!(ValueType::from_name(" int "), Some(ValueType::Integer));
        assert_eq!(ValueType::from_name("list"), Some(ValueType::Sequence));
        assert_eq!(ValueType::from_name("BYTES"), Some(ValueType::Bytes));
        assert_eq!(ValueType::from_name("np.ndarray"), None);
        assert_eq!(ValueType::from_name("__import__('os')"), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for (_, value_type) in TYPE_NAMES {
            assert_eq!(ValueType::from_name(value_type.name()), Some(*value_type));
        }
    }
}
