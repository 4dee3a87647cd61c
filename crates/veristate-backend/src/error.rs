//! Error types for backend operations.

use thiserror::Error;

/// Errors a provisioning backend can return.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    /// The backend rejected the configuration or failed to converge remote
    /// state to it. Fatal to the step; never retried by the caller.
    #[error("convergence failed: {0}")]
    Convergence(String),

    /// The operation could not reach the backend. Transient; the backend is
    /// expected to have exhausted its own retries before surfacing this.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProvisionError {
    /// Returns true for errors that indicate a transport-level failure
    /// rather than a rejected configuration.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors a remote API lookup can return.
///
/// A lookup that finds nothing is not an error: `RemoteClient::get` returns
/// `Ok(None)` for an affirmative not-found. These variants cover everything
/// else, so absence can never be conflated with an outage.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Network-level failure. Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend refused the credentials. Not retryable.
    #[error("authorization error: {0}")]
    Auth(String),
}

impl RemoteError {
    /// Returns true if retrying the lookup could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
