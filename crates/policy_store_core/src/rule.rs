//! Policy rules and their mapping onto the fixed-width row.
//!
//! A rule is a variable-arity ordered field list; the table flattens it
//! into six nullable columns. Pack/unpack lives here so the SQL layer
//! never reasons about arity.

use serde::{Deserialize, Serialize};

use crate::error::{PolicyStoreError, Result};

/// Width of the `v0..v5` column block.
pub const MAX_FIELDS: usize = 6;

/// An ordered sequence of up to 6 string fields. The populated fields are
/// always contiguous from index 0 — a rule cannot contain a gap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRule(Vec<String>);

impl PolicyRule {
    /// Build a rule from its fields, rejecting arities beyond the row width.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.len() > MAX_FIELDS {
            return Err(PolicyStoreError::InvalidRule(format!(
                "{} fields exceed the column width of {}",
                fields.len(),
                MAX_FIELDS
            )));
        }
        Ok(Self(fields))
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pack into the fixed-width column block; trailing columns are None.
    pub fn to_columns(&self) -> [Option<&str>; MAX_FIELDS] {
        let mut cols: [Option<&str>; MAX_FIELDS] = Default::default();
        for (i, field) in self.0.iter().enumerate() {
            cols[i] = Some(field.as_str());
        }
        cols
    }

    /// Unpack from a row's column block, taking the populated prefix.
    /// Reading stops at the first null/empty column; columns are written
    /// contiguously, so nothing meaningful can follow one.
    pub fn from_columns(cols: [Option<String>; MAX_FIELDS]) -> Self {
        let fields: Vec<String> = cols
            .into_iter()
            .map_while(|c| c.filter(|v| !v.is_empty()))
            .collect();
        Self(fields)
    }

    /// The comma-joined line form the engine's model parser consumes,
    /// e.g. `p, alice, data1, read`.
    pub fn to_line(&self, ptype: &str) -> String {
        let mut parts = Vec::with_capacity(1 + self.0.len());
        parts.push(ptype);
        parts.extend(self.0.iter().map(String::as_str));
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_up_to_six_fields() {
        let r = PolicyRule::new(["a", "b", "c", "d", "e", "f"]).unwrap();
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn new_accepts_the_degenerate_empty_rule() {
        let r = PolicyRule::new(Vec::<String>::new()).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.to_line("p"), "p");
    }

    #[test]
    fn new_rejects_seven_fields() {
        let err = PolicyRule::new(["a", "b", "c", "d", "e", "f", "g"]).unwrap_err();
        assert!(matches!(err, PolicyStoreError::InvalidRule(_)));
    }

    #[test]
    fn to_columns_pads_with_none() {
        let r = PolicyRule::new(["alice", "data1", "read"]).unwrap();
        assert_eq!(
            r.to_columns(),
            [Some("alice"), Some("data1"), Some("read"), None, None, None]
        );
    }

    #[test]
    fn from_columns_takes_populated_prefix() {
        let r = PolicyRule::from_columns([
            Some("alice".into()),
            Some("data1".into()),
            None,
            None,
            None,
            None,
        ]);
        assert_eq!(r.fields(), ["alice", "data1"]);
    }

    #[test]
    fn from_columns_stops_at_empty_string() {
        let r = PolicyRule::from_columns([
            Some("alice".into()),
            Some(String::new()),
            Some("stale".into()),
            None,
            None,
            None,
        ]);
        assert_eq!(r.fields(), ["alice"]);
    }

    #[test]
    fn round_trips_through_columns() {
        for arity in 1..=MAX_FIELDS {
            let fields: Vec<String> = (0..arity).map(|i| format!("f{i}")).collect();
            let rule = PolicyRule::new(fields.clone()).unwrap();
            let cols = rule.to_columns().map(|c| c.map(str::to_string));
            assert_eq!(PolicyRule::from_columns(cols).fields(), fields.as_slice());
        }
    }

    #[test]
    fn line_form_is_comma_space_joined() {
        let r = PolicyRule::new(["alice", "data1", "read"]).unwrap();
        assert_eq!(r.to_line("p"), "p, alice, data1, read");
    }
}
