//! The seam between the store and the external engine's model.

use std::collections::BTreeMap;

use crate::rule::PolicyRule;

/// What the adapter needs from the engine's in-memory model: a line-loader
/// for reads and a section enumerator for `save_policy`. The engine's own
/// model type implements this; [`MemoryModel`] is a self-contained
/// implementation for embedders and tests.
pub trait PolicyModel {
    /// Parse one comma-joined rule line (e.g. `p, alice, data1, read`) and
    /// insert it into the model. Lines the model cannot represent are
    /// dropped silently, matching engine-side line loaders.
    fn load_policy_line(&mut self, line: &str);

    /// The `(ptype, rules)` pairs of one section (`"p"` or `"g"`), or None
    /// when the model has no such section.
    fn section(&self, sec: &str) -> Option<Vec<(String, Vec<PolicyRule>)>>;
}

/// Section -> ptype -> rules, insertion-ordered within a ptype.
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    sections: BTreeMap<String, BTreeMap<String, Vec<PolicyRule>>>,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule under `sec`/`ptype`, preserving insertion order.
    pub fn add_rule(&mut self, sec: &str, ptype: &str, rule: PolicyRule) {
        self.sections
            .entry(sec.to_string())
            .or_default()
            .entry(ptype.to_string())
            .or_default()
            .push(rule);
    }

    /// The rules stored under `sec`/`ptype`, in insertion order.
    pub fn rules(&self, sec: &str, ptype: &str) -> &[PolicyRule] {
        self.sections
            .get(sec)
            .and_then(|ptypes| ptypes.get(ptype))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total rule count across all sections.
    pub fn len(&self) -> usize {
        self.sections
            .values()
            .flat_map(|ptypes| ptypes.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }
}

impl PolicyModel for MemoryModel {
    fn load_policy_line(&mut self, line: &str) {
        let mut tokens = line.split(',').map(str::trim);
        let Some(ptype) = tokens.next().filter(|t| !t.is_empty()) else {
            return;
        };
        // The section key is the leading character of the ptype: "p2" files
        // under "p", "g3" under "g".
        let sec: String = ptype.chars().take(1).collect();
        let fields: Vec<&str> = tokens.collect();
        if let Ok(rule) = PolicyRule::new(fields) {
            self.add_rule(&sec, ptype, rule);
        }
    }

    fn section(&self, sec: &str) -> Option<Vec<(String, Vec<PolicyRule>)>> {
        self.sections.get(sec).map(|ptypes| {
            ptypes
                .iter()
                .map(|(ptype, rules)| (ptype.clone(), rules.clone()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_line_files_under_leading_character() {
        let mut m = MemoryModel::new();
        m.load_policy_line("p, alice, data1, read");
        m.load_policy_line("g, alice, data2_admin");
        assert_eq!(
            m.rules("p", "p"),
            [PolicyRule::new(["alice", "data1", "read"]).unwrap()]
        );
        assert_eq!(
            m.rules("g", "g"),
            [PolicyRule::new(["alice", "data2_admin"]).unwrap()]
        );
    }

    #[test]
    fn numbered_ptype_files_under_base_section() {
        let mut m = MemoryModel::new();
        m.load_policy_line("p2, alice, data1");
        let section = m.section("p").unwrap();
        assert_eq!(section[0].0, "p2");
    }

    #[test]
    fn blank_line_is_dropped() {
        let mut m = MemoryModel::new();
        m.load_policy_line("");
        m.load_policy_line("  ,  ");
        assert!(m.is_empty());
    }

    #[test]
    fn section_is_none_when_absent() {
        let m = MemoryModel::new();
        assert!(m.section("g").is_none());
    }

    #[test]
    fn insertion_order_is_preserved_within_a_ptype() {
        let mut m = MemoryModel::new();
        m.load_policy_line("p, bob, data2, write");
        m.load_policy_line("p, alice, data1, read");
        let fields: Vec<&str> = m
            .rules("p", "p")
            .iter()
            .map(|r| r.fields()[0].as_str())
            .collect();
        assert_eq!(fields, ["bob", "alice"]);
    }

    #[test]
    fn clear_empties_every_section() {
        let mut m = MemoryModel::new();
        m.load_policy_line("p, alice, data1, read");
        m.clear();
        assert!(m.is_empty());
        assert!(m.section("p").is_none());
    }
}
