//! Declarative configuration blob.

use serde::{Deserialize, Serialize};

/// An opaque declarative configuration.
///
/// Produced by templating outside the harness; the engine never inspects the
/// text, it only submits it to a [`crate::Provisioner`] and observes whether
/// convergence succeeds and what state it yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredConfig(String);

impl DeclaredConfig {
    /// Wraps configuration text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the configuration text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DeclaredConfig {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl std::fmt::Display for DeclaredConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
