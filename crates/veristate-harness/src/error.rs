//! Error types for the verification engine.

use thiserror::Error;
use veristate_backend::{ChangeSet, FieldDiff, ProvisionError, RemoteError};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, StepError>;

/// Everything that can make a step fail.
///
/// The executor surfaces the first failure it hits; the sequencer aborts the
/// remaining steps but still runs destroy-verification, merging both results
/// into the case report.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    /// Transport-level failure from the provisioning engine or the remote
    /// API, after internal retries were exhausted.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provisioning engine rejected or failed to apply a configuration.
    #[error("convergence error: {0}")]
    Convergence(String),

    /// Observed state diverged from an expectation on a single field.
    #[error("assertion mismatch on {field:?}: expected {expected}, got {actual:?}")]
    AssertionMismatch {
        /// Attribute the assertion named.
        field: String,
        /// Human-readable expectation.
        expected: String,
        /// Observed value, if any.
        actual: Option<String>,
    },

    /// Import-derived state diverged from the applied state outside the
    /// non-readable allow-list.
    #[error("import mismatch: {}", format_diffs(.0))]
    ImportMismatch(Vec<FieldDiff>),

    /// A dry-run plan proposed changes when none were expected.
    #[error("unexpected drift: {0}")]
    Drift(ChangeSet),

    /// An apply expected to fail succeeded instead — a regression in
    /// duplicate detection or validation.
    #[error("apply unexpectedly succeeded, wanted error matching {pattern:?}")]
    UnexpectedSuccess {
        /// Pattern the error was expected to match.
        pattern: String,
    },

    /// An apply failed as expected, but with an unrecognizable error.
    #[error("error did not match {pattern:?}: {actual}")]
    ErrorSignatureMismatch {
        /// Pattern the error was expected to match.
        pattern: String,
        /// The error the engine actually returned.
        actual: String,
    },

    /// The step ran past the caller-supplied deadline.
    #[error("step exceeded its {0:?} deadline")]
    DeadlineExceeded(std::time::Duration),

    /// The case was cancelled while this step was pending or running.
    #[error("step cancelled")]
    Cancelled,

    /// A step was sequenced in an impossible position, e.g. an import with
    /// no preceding successful apply.
    #[error("invalid step sequence: {0}")]
    InvalidSequence(String),
}

fn format_diffs(diffs: &[FieldDiff]) -> String {
    diffs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ProvisionError> for StepError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Convergence(msg) => Self::Convergence(msg),
            ProvisionError::Transport(msg) => Self::Transport(msg),
        }
    }
}

impl From<RemoteError> for StepError {
    fn from(err: RemoteError) -> Self {
        Self::Transport(err.to_string())
    }
}
