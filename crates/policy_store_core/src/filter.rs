//! Column filters for partial loads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rule::MAX_FIELDS;

/// A filterable column of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Ptype,
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Ptype => "ptype",
            Column::V0 => "v0",
            Column::V1 => "v1",
            Column::V2 => "v2",
            Column::V3 => "v3",
            Column::V4 => "v4",
            Column::V5 => "v5",
        }
    }

    /// The value column at `index`, if within the row width.
    pub fn value_at(index: usize) -> Option<Column> {
        match index {
            0 => Some(Column::V0),
            1 => Some(Column::V1),
            2 => Some(Column::V2),
            3 => Some(Column::V3),
            4 => Some(Column::V4),
            5 => Some(Column::V5),
            _ => None,
        }
    }
}

/// Per-column predicate: an exact value or a candidate set. Translated
/// verbatim to `=` / `IN` at query-build time — no wildcards, no partial
/// string matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldMatch {
    Equals(String),
    OneOf(Vec<String>),
}

/// A conjunction of per-column predicates for `load_filtered_policy`.
/// Column-ordered so the generated SQL is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    entries: BTreeMap<Column, FieldMatch>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `column` to exactly `value`. Replaces any prior predicate
    /// on the same column.
    pub fn equals(mut self, column: Column, value: impl Into<String>) -> Self {
        self.entries.insert(column, FieldMatch::Equals(value.into()));
        self
    }

    /// Constrain `column` to any of `values`. An empty set matches nothing.
    pub fn one_of<I, S>(mut self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.entries.insert(column, FieldMatch::OneOf(values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Column, &FieldMatch)> {
        self.entries.iter()
    }
}

// Sanity link between the column enum and the row width.
const _: () = assert!(MAX_FIELDS == 6);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_at_covers_row_width() {
        assert_eq!(Column::value_at(0), Some(Column::V0));
        assert_eq!(Column::value_at(5), Some(Column::V5));
        assert_eq!(Column::value_at(6), None);
    }

    #[test]
    fn entries_are_column_ordered() {
        let f = Filter::new()
            .equals(Column::V1, "data1")
            .equals(Column::Ptype, "p");
        let cols: Vec<&str> = f.entries().map(|(c, _)| c.as_str()).collect();
        assert_eq!(cols, ["ptype", "v1"]);
    }

    #[test]
    fn later_predicate_replaces_earlier_on_same_column() {
        let f = Filter::new()
            .equals(Column::V0, "alice")
            .one_of(Column::V0, ["alice", "bob"]);
        let (_, m) = f.entries().next().unwrap();
        assert_eq!(m, &FieldMatch::OneOf(vec!["alice".into(), "bob".into()]));
    }
}
