//! # Page Conditions
//!
//! Named boolean page properties (`global`, `single`, `search`, ...) and
//! the inclusion rules assets use to opt in or out of a page.
//!
//! A condition can be written three ways:
//!
//! ```text
//! "single"                               -> include: ["single"]
//! ["single", "search"]                   -> include: ["single", "search"]
//! {"include_any": [...], "exclude": "x"} -> explicit rules
//! ```
//!
//! Unknown condition names evaluate to `false`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CONDITION
// =============================================================================

/// Inclusion rule attached to an asset or symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Named(String),
    All(Vec<String>),
    Rules(ConditionRules),
}

/// Explicit rule set. Every non-empty clause must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionRules {
    /// All listed names must be true.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// At least one listed name must be true.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub include_any: Vec<String>,
    /// All listed names must be false.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

impl Condition {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Normalize any shorthand form into explicit rules.
    #[must_use]
    pub fn to_rules(&self) -> ConditionRules {
        match self {
            Self::Named(name) if name.is_empty() => ConditionRules::default(),
            Self::Named(name) => ConditionRules {
                include: vec![name.clone()],
                ..ConditionRules::default()
            },
            Self::All(names) => ConditionRules {
                include: names.clone(),
                ..ConditionRules::default()
            },
            Self::Rules(rules) => rules.clone(),
        }
    }
}

// =============================================================================
// CONDITION SET
// =============================================================================

/// The current page's condition values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet {
    values: BTreeMap<String, bool>,
}

impl Default for ConditionSet {
    fn default() -> Self {
        let mut set = Self::empty();
        set.set("global", true).set("single", false).set("search", false);
        set
    }
}

impl ConditionSet {
    /// The default set: `global` true, `single` and `search` false.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with no names at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    /// Overlay values from another map.
    pub fn extend<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        for (name, value) in values {
            self.set(name, value);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> bool {
        self.values.get(name).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Evaluate an asset's condition against this set. No condition means include.
    #[must_use]
    pub fn should_include(&self, condition: Option<&Condition>) -> bool {
        let Some(condition) = condition else {
            return true;
        };
        let rules = condition.to_rules();

        if !rules.include.is_empty() && !rules.include.iter().all(|name| self.get(name)) {
            return false;
        }
        if !rules.include_any.is_empty() && !rules.include_any.iter().any(|name| self.get(name)) {
            return false;
        }
        if !rules.exclude.is_empty() && rules.exclude.iter().any(|name| self.get(name)) {
            return false;
        }
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================
