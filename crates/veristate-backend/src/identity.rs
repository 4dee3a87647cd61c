//! Resource identity and unique-name generation.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// The external key tuple addressing exactly one remote object.
///
/// An identity is fixed when a test case is constructed and never changes
/// afterwards; every remote call a case makes (apply, probe, import, destroy)
/// is addressed by the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    /// Resource kind, e.g. `bus_namespace`.
    pub kind: String,
    /// Logical name of the declaration inside its configuration,
    /// e.g. `test` or `import`.
    pub logical_name: String,
    /// Resource group the remote object lives in.
    pub resource_group: String,
    /// Remote object name.
    pub resource_name: String,
}

impl ResourceIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        logical_name: impl Into<String>,
        resource_group: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            logical_name: logical_name.into(),
            resource_group: resource_group.into(),
            resource_name: resource_name.into(),
        }
    }

    /// Returns the remote address (kind + key fields) without the logical
    /// name. Two declarations alias each other when their remote addresses
    /// are equal, whatever their logical names.
    #[must_use]
    pub fn remote_address(&self) -> (&str, &str, &str) {
        (&self.kind, &self.resource_group, &self.resource_name)
    }

    /// Returns true if both identities address the same remote object.
    #[must_use]
    pub fn aliases(&self, other: &Self) -> bool {
        self.remote_address() == other.remote_address()
    }
}

impl std::fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.resource_group, self.resource_name)
    }
}

/// Capability for generating collision-free names across concurrent cases.
///
/// Identity generation is a collaborator, not engine logic: the engine only
/// requires that two concurrently running cases never produce the same
/// remote address.
pub trait NameGenerator: Send + Sync {
    /// Returns a fresh suffix, unique within the current run.
    fn unique_suffix(&self) -> String;
}

/// Random alphanumeric suffix generator.
#[derive(Debug, Clone, Default)]
pub struct RandomSuffix {
    len: usize,
}

impl RandomSuffix {
    /// Creates a generator producing suffixes of `len` characters.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl NameGenerator for RandomSuffix {
    fn unique_suffix(&self) -> String {
        let len = if self.len == 0 { 8 } else { self.len };
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect()
    }
}
