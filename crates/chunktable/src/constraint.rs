// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Per-query constraint set.
//!
//! The query adapter builds one `ConstraintSet` per scan from the predicates
//! the engine pushed down. Values keep the order in which they were added, so
//! "first value" accessors have a well-defined tie-break: first seen wins.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ChunkTableError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    Like,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintValue {
    Text(String),
    Integer(i64),
}

impl ConstraintValue {
    /// Text form of the value, as the engine would compare it
    pub fn as_text(&self) -> String {
        match self {
            ConstraintValue::Text(s) => s.clone(),
            ConstraintValue::Integer(i) => i.to_string(),
        }
    }

    /// Parse as a non-negative integer
    pub fn as_unsigned(&self) -> Result<u64> {
        match self {
            ConstraintValue::Integer(i) => {
                u64::try_from(*i).map_err(|_| ChunkTableError::InvalidOffset {
                    value: i.to_string(),
                })
            }
            ConstraintValue::Text(s) => {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| ChunkTableError::InvalidOffset { value: s.clone() })
            }
        }
    }
}

impl fmt::Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintValue::Text(s) => write!(f, "'{}'", s),
            ConstraintValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

/// Ordered (operator, value) pairs for one column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintList {
    items: Vec<(Operator, ConstraintValue)>,
}

impl ConstraintList {
    pub fn push(&mut self, op: Operator, value: ConstraintValue) {
        self.items.push((op, value));
    }

    pub fn exists(&self, op: Operator) -> bool {
        self.items.iter().any(|(o, _)| *o == op)
    }

    /// All values for `op`, in insertion order
    pub fn get_all(&self, op: Operator) -> impl Iterator<Item = &ConstraintValue> {
        self.items
            .iter()
            .filter(move |(o, _)| *o == op)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    columns: BTreeMap<String, ConstraintList>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, column: S, op: Operator, value: ConstraintValue) {
        self.columns.entry(column.into()).or_default().push(op, value);
    }

    /// Builder form of [`ConstraintSet::add`], handy in tests
    pub fn with<S: Into<String>>(mut self, column: S, op: Operator, value: ConstraintValue) -> Self {
        self.add(column, op, value);
        self
    }

    pub fn column(&self, column: &str) -> Option<&ConstraintList> {
        self.columns.get(column)
    }

    pub fn is_constrained(&self, column: &str) -> bool {
        self.column(column).is_some_and(|list| !list.is_empty())
    }

    /// Text values of `column` under `op`, in insertion order
    pub fn texts(&self, column: &str, op: Operator) -> Vec<String> {
        self.column(column)
            .map(|list| list.get_all(op).map(ConstraintValue::as_text).collect())
            .unwrap_or_default()
    }

    /// First-seen value of `column` under `op`, parsed as a non-negative integer.
    ///
    /// Returns `Ok(None)` when no such constraint exists. Later values are
    /// ignored; the caller decides whether to report them.
    pub fn first_unsigned(&self, column: &str, op: Operator) -> Result<Option<u64>> {
        let Some(first) = self.column(column).and_then(|list| list.get_all(op).next()) else {
            return Ok(None);
        };
        first.as_unsigned().map(Some)
    }

    /// Number of values for `column` under `op`
    pub fn count(&self, column: &str, op: Operator) -> usize {
        self.column(column)
            .map(|list| list.get_all(op).count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_unsigned_defaults_to_none() {
        let set = ConstraintSet::new();
        assert_eq!(set.first_unsigned("offset", Operator::Equals).unwrap(), None);
    }

    #[test]
    fn test_first_seen_wins() {
        let set = ConstraintSet::new()
            .with("offset", Operator::Equals, ConstraintValue::Integer(20))
            .with("offset", Operator::Equals, ConstraintValue::Integer(10));
        assert_eq!(set.first_unsigned("offset", Operator::Equals).unwrap(), Some(20));
        assert_eq!(set.count("offset", Operator::Equals), 2);
    }

    #[test]
    fn test_text_offset_parses() {
        let set = ConstraintSet::new().with(
            "offset",
            Operator::Equals,
            ConstraintValue::Text(" 512".to_string()),
        );
        assert_eq!(set.first_unsigned("offset", Operator::Equals).unwrap(), Some(512));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let set = ConstraintSet::new().with("offset", Operator::Equals, ConstraintValue::Integer(-1));
        let err = set.first_unsigned("offset", Operator::Equals).unwrap_err();
        assert!(matches!(err, ChunkTableError::InvalidOffset { value } if value == "-1"));
    }

    #[test]
    fn test_texts_filters_by_operator() {
        let set = ConstraintSet::new()
            .with("path", Operator::Equals, ConstraintValue::Text("/a".into()))
            .with("path", Operator::Like, ConstraintValue::Text("/b/%".into()))
            .with("path", Operator::Equals, ConstraintValue::Text("/c".into()));

        assert_eq!(set.texts("path", Operator::Equals), vec!["/a", "/c"]);
        assert_eq!(set.texts("path", Operator::Like), vec!["/b/%"]);
        assert!(set.is_constrained("path"));
        assert!(!set.is_constrained("offset"));
    }
}
