//! Observed state and change sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The attribute set read back from a backend.
///
/// Attributes are a flat map of string keys to string values; nested
/// structures are flattened with dotted and indexed keys
/// (`network_rulesets.ip_rule.0.ip_mask`). Keeping the map ordered makes
/// diffs and failure reports deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedState {
    attributes: BTreeMap<String, String>,
}

impl ObservedState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of an attribute, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }

    /// Sets an attribute.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// Builder-style attribute insertion.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.attributes.remove(field)
    }

    /// Returns true if no attributes are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Iterates over attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field-for-field comparison against `other`, skipping fields named in
    /// `allow_list` on either side. Every remaining divergence, including a
    /// field present on only one side, is reported.
    #[must_use]
    pub fn diff(&self, other: &Self, allow_list: &[&str]) -> Vec<FieldDiff> {
        let mut diffs = Vec::new();
        let mut fields: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        for field in other.attributes.keys() {
            if !self.attributes.contains_key(field) {
                fields.push(field);
            }
        }
        fields.sort_unstable();

        for field in fields {
            if allow_list.contains(&field) {
                continue;
            }
            let expected = self.get(field);
            let actual = other.get(field);
            if expected != actual {
                diffs.push(FieldDiff {
                    field: field.to_string(),
                    expected: expected.map(str::to_string),
                    actual: actual.map(str::to_string),
                });
            }
        }
        diffs
    }
}

impl FromIterator<(String, String)> for ObservedState {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// One field that differs between two observed states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Attribute name.
    pub field: String,
    /// Value on the reference side, if any.
    pub expected: Option<String>,
    /// Value on the compared side, if any.
    pub actual: Option<String>,
}

impl std::fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {:?}, got {:?}",
            self.field, self.expected, self.actual
        )
    }
}

/// One change a plan proposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedChange {
    /// Attribute the plan wants to change.
    pub field: String,
    /// Current remote value, if any.
    pub old: Option<String>,
    /// Declared value, if any.
    pub new: Option<String>,
}

impl std::fmt::Display for PlannedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?} -> {:?}", self.field, self.old, self.new)
    }
}

/// The set of changes a dry-run plan proposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    changes: Vec<PlannedChange>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records a proposed change.
    pub fn push(&mut self, field: impl Into<String>, old: Option<String>, new: Option<String>) {
        self.changes.push(PlannedChange {
            field: field.into(),
            old,
            new,
        });
    }

    /// Returns true if the plan proposes no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of proposed changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The proposed changes.
    #[must_use]
    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }
}

impl std::fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.changes.is_empty() {
            return f.write_str("no changes");
        }
        for (i, change) in self.changes.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{change}")?;
        }
        Ok(())
    }
}
