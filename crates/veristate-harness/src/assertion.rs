//! Attribute assertions.
//!
//! Assertions are data, not callbacks: a named field plus an expectation the
//! executor evaluates against probed state. This keeps a case declaration a
//! plain table and failure reports uniform.

use crate::error::{Result, StepError};
use regex::Regex;
use veristate_backend::ObservedState;

/// What an assertion expects of a field.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// The field equals this value exactly.
    Equals(String),
    /// The field matches this pattern. Used where the value embeds generated
    /// material a case cannot pin down, e.g. a connection string carrying a
    /// fresh secret.
    Matches(Regex),
    /// The field is present and non-empty.
    Present,
    /// The field is present and differs from another field's value. Used
    /// for credential pairs that must never collide.
    DiffersFrom(String),
}

/// One named assertion against observed state.
#[derive(Debug, Clone)]
pub struct AttrAssertion {
    field: String,
    expectation: Expectation,
}

impl AttrAssertion {
    /// The field must equal `value` exactly.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expectation: Expectation::Equals(value.into()),
        }
    }

    /// The field must match `pattern`.
    ///
    /// # Panics
    /// Panics if `pattern` is not a valid regex; assertion tables are
    /// authored with literal patterns, so this is a programming error.
    #[must_use]
    pub fn matches(field: impl Into<String>, pattern: &str) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid assertion pattern {pattern:?}: {e}"));
        Self {
            field: field.into(),
            expectation: Expectation::Matches(regex),
        }
    }

    /// The field must be present and non-empty.
    #[must_use]
    pub fn present(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expectation: Expectation::Present,
        }
    }

    /// The field must be present and differ from `other` field's value.
    #[must_use]
    pub fn differs_from(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expectation: Expectation::DiffersFrom(other.into()),
        }
    }

    /// The asserted field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Evaluates the assertion against `state`.
    ///
    /// # Errors
    /// `AssertionMismatch` describing the field, the expectation, and the
    /// observed value.
    pub fn check(&self, state: &ObservedState) -> Result<()> {
        let actual = state.get(&self.field);
        let ok = match &self.expectation {
            Expectation::Equals(want) => actual == Some(want.as_str()),
            Expectation::Matches(regex) => actual.is_some_and(|v| regex.is_match(v)),
            Expectation::Present => actual.is_some_and(|v| !v.is_empty()),
            Expectation::DiffersFrom(other) => match (actual, state.get(other)) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            },
        };
        if ok {
            return Ok(());
        }
        Err(StepError::AssertionMismatch {
            field: self.field.clone(),
            expected: self.describe(),
            actual: actual.map(str::to_string),
        })
    }

    fn describe(&self) -> String {
        match &self.expectation {
            Expectation::Equals(want) => format!("== {want:?}"),
            Expectation::Matches(regex) => format!("matches /{}/", regex.as_str()),
            Expectation::Present => "present and non-empty".into(),
            Expectation::DiffersFrom(other) => format!("differs from {other:?}"),
        }
    }
}

/// Evaluates every assertion, surfacing the first mismatch.
///
/// # Errors
/// The first `AssertionMismatch` encountered, in table order.
pub fn check_all(assertions: &[AttrAssertion], state: &ObservedState) -> Result<()> {
    for assertion in assertions {
        assertion.check(state)?;
    }
    Ok(())
}
