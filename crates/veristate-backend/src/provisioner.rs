//! Consumed backend capabilities.
//!
//! The harness never owns a provisioning engine or an API client; it holds
//! explicit handles to these traits, threaded through the sequencer and the
//! probe. No process-wide singletons.

use crate::config::DeclaredConfig;
use crate::error::{ProvisionError, RemoteError};
use crate::identity::ResourceIdentity;
use crate::state::{ChangeSet, ObservedState};
use async_trait::async_trait;

/// Result of a successful apply: the identity the configuration resolved to
/// and the state the backend reports after convergence.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Identity of the converged resource.
    pub identity: ResourceIdentity,
    /// Post-convergence state, including attributes only returned at
    /// creation time (generated credentials).
    pub state: ObservedState,
}

/// A provisioning engine: accepts a declarative configuration and converges
/// remote state to match it.
///
/// Implementations are expected to perform their own convergence retries;
/// the harness treats every returned error as final for the step.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Converges remote state to `config`.
    async fn apply(&self, config: &DeclaredConfig) -> Result<Applied, ProvisionError>;

    /// Dry-run: returns the changes that applying `config` on top of
    /// `previous` would make, without touching remote state.
    async fn plan(
        &self,
        config: &DeclaredConfig,
        previous: &ObservedState,
    ) -> Result<ChangeSet, ProvisionError>;

    /// Derives managed state for an already-existing remote resource from
    /// its identity alone, without creating anything.
    async fn import_resource(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<ObservedState, ProvisionError>;

    /// Destroys the resource addressed by `identity`.
    async fn destroy(&self, identity: &ResourceIdentity) -> Result<(), ProvisionError>;
}

/// A remote API client: point reads of backend state.
///
/// `Ok(None)` means the backend affirmatively reports no such object;
/// transport and authorization failures come back as [`RemoteError`] and are
/// never folded into absence.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Reads the attributes of the resource addressed by `identity`.
    async fn get(
        &self,
        identity: &ResourceIdentity,
    ) -> Result<Option<ObservedState>, RemoteError>;
}
