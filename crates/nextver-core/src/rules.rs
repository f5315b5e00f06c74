//! Release rules: which increment level each commit type warrants.
//!
//! The table starts from [`DEFAULT_RULES`] and is overlaid with configured
//! [`ReleaseRule`]s, last write winning. Types absent from the table map to
//! [`IncrementLevel::None`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::version::IncrementLevel;

/// Built-in rules.
///
/// The explicit `None` entries let configuration override a single type
/// without touching the others.
pub const DEFAULT_RULES: &[(&str, IncrementLevel)] = &[
    ("feat", IncrementLevel::Minor),
    ("fix", IncrementLevel::Patch),
    ("docs", IncrementLevel::None),
    ("style", IncrementLevel::None),
    ("refactor", IncrementLevel::None),
    ("perf", IncrementLevel::None),
    ("test", IncrementLevel::None),
    ("chore", IncrementLevel::None),
    ("build", IncrementLevel::None),
    ("ci", IncrementLevel::None),
];

/// A single configured rule, e.g. `{ type = "perf", release = "patch" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRule {
    /// Commit type the rule applies to.
    #[serde(rename = "type")]
    pub commit_type: String,
    /// Level to apply; case-insensitive when read from configuration.
    pub release: IncrementLevel,
}

impl ReleaseRule {
    /// Create a rule.
    pub fn new(commit_type: impl Into<String>, release: IncrementLevel) -> Self {
        Self {
            commit_type: commit_type.into(),
            release,
        }
    }
}

/// Mapping from commit type to increment level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<String, IncrementLevel>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(ty, level)| ((*ty).to_string(), *level))
                .collect(),
        }
    }
}

impl RuleTable {
    /// A table holding [`DEFAULT_RULES`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The default table overlaid with `overrides`, in order.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = &'a ReleaseRule>,
    {
        let mut table = Self::default();
        for rule in overrides {
            table.set(&rule.commit_type, rule.release);
        }
        table
    }

    /// Insert or replace the level for a commit type.
    pub fn set(&mut self, commit_type: &str, level: IncrementLevel) {
        self.rules.insert(commit_type.to_string(), level);
    }

    /// Level for a commit type; unknown types yield `None`.
    pub fn lookup(&self, commit_type: &str) -> IncrementLevel {
        self.rules.get(commit_type).copied().unwrap_or_default()
    }

    /// Entries in type-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, IncrementLevel)> {
        self.rules.iter().map(|(ty, level)| (ty.as_str(), *level))
    }

    /// Entries as rules, for display and serialization.
    pub fn to_rules(&self) -> Vec<ReleaseRule> {
        self.iter()
            .map(|(ty, level)| ReleaseRule::new(ty, level))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_feat_and_fix() {
        let table = RuleTable::new();
        assert_eq!(table.lookup("feat"), IncrementLevel::Minor);
        assert_eq!(table.lookup("fix"), IncrementLevel::Patch);
        for ty in ["docs", "style", "refactor", "perf", "test", "chore", "build", "ci"] {
            assert_eq!(table.lookup(ty), IncrementLevel::None, "{ty}");
        }
        assert_eq!(table.iter().count(), DEFAULT_RULES.len());
    }

    #[test]
    fn unknown_type_is_none() {
        assert_eq!(RuleTable::new().lookup("wip"), IncrementLevel::None);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(RuleTable::new().lookup("Feat"), IncrementLevel::None);
    }

    #[test]
    fn overrides_replace_single_entries() {
        let overrides = vec![ReleaseRule::new("perf", IncrementLevel::Patch)];
        let table = RuleTable::with_overrides(&overrides);
        assert_eq!(table.lookup("perf"), IncrementLevel::Patch);
        assert_eq!(table.lookup("refactor"), IncrementLevel::None);
        assert_eq!(table.lookup("feat"), IncrementLevel::Minor);
    }

    #[test]
    fn overrides_add_new_types() {
        let overrides = vec![ReleaseRule::new("security", IncrementLevel::Patch)];
        let table = RuleTable::with_overrides(&overrides);
        assert_eq!(table.lookup("security"), IncrementLevel::Patch);
        assert_eq!(table.iter().count(), DEFAULT_RULES.len() + 1);
    }

    #[test]
    fn last_override_wins() {
        let overrides = vec![
            ReleaseRule::new("docs", IncrementLevel::Patch),
            ReleaseRule::new("docs", IncrementLevel::Minor),
        ];
        let table = RuleTable::with_overrides(&overrides);
        assert_eq!(table.lookup("docs"), IncrementLevel::Minor);
    }

    #[test]
    fn overriding_does_not_touch_defaults() {
        let overrides = vec![ReleaseRule::new("feat", IncrementLevel::Major)];
        let _ = RuleTable::with_overrides(&overrides);
        assert_eq!(RuleTable::new().lookup("feat"), IncrementLevel::Minor);
    }

    #[test]
    fn rule_deserializes_with_any_case() {
        let rule: ReleaseRule =
            serde_json::from_str(r#"{"type": "perf", "release": "PATCH"}"#).unwrap();
        assert_eq!(rule, ReleaseRule::new("perf", IncrementLevel::Patch));
    }

    #[test]
    fn to_rules_is_sorted_by_type() {
        let rules = RuleTable::new().to_rules();
        assert_eq!(rules.first().map(|r| r.commit_type.as_str()), Some("build"));
    }
}
