//! Remote state probe.
//!
//! Wraps a [`RemoteClient`] and answers one question per call: does the
//! resource exist right now, and with which attributes? The answer space is
//! deliberately three-valued — [`ProbeOutcome::Found`],
//! [`ProbeOutcome::Absent`], or an error — because destroy-verification must
//! never mistake an outage for absence.

use crate::error::{Result, StepError};
use std::sync::Arc;
use std::time::Duration;
use veristate_backend::{ObservedState, RemoteClient, ResourceIdentity};

/// What a probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The backend returned the resource and its attributes.
    Found(ObservedState),
    /// The backend affirmatively reported no such object.
    Absent,
}

impl ProbeOutcome {
    /// Returns the attributes if the resource was found.
    #[must_use]
    pub fn state(&self) -> Option<&ObservedState> {
        match self {
            Self::Found(state) => Some(state),
            Self::Absent => None,
        }
    }
}

/// Backoff between probe retries.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Fixed(Duration),
    /// Exponential backoff with a ceiling.
    Exponential {
        /// Delay before the first retry.
        initial: Duration,
        /// Maximum delay between retries.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential { initial, max } => {
                let delay = initial.saturating_mul(2u32.saturating_pow(attempt));
                delay.min(*max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(5),
        }
    }
}

/// Retry policy for transient lookup failures.
///
/// Only retryable errors are retried; a definitive not-found response and an
/// authorization failure both end the probe immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff between attempts.
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffStrategy::default(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: BackoffStrategy::Fixed(Duration::ZERO),
        }
    }
}

/// Remote state probe with bounded retries.
pub struct StateProbe {
    client: Arc<dyn RemoteClient>,
    retry: RetryPolicy,
}

impl StateProbe {
    /// Creates a probe over `client` with the given retry policy.
    pub fn new(client: Arc<dyn RemoteClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Probes the resource addressed by `identity`.
    ///
    /// # Errors
    /// Returns `StepError::Transport` once transient failures exhaust the
    /// retry budget, or immediately for non-retryable lookup errors.
    pub async fn probe(&self, identity: &ResourceIdentity) -> Result<ProbeOutcome> {
        let mut attempt = 0u32;
        loop {
            match self.client.get(identity).await {
                Ok(Some(state)) => {
                    tracing::debug!(%identity, attrs = state.len(), "probe found resource");
                    return Ok(ProbeOutcome::Found(state));
                }
                Ok(None) => {
                    tracing::debug!(%identity, "probe confirmed absence");
                    return Ok(ProbeOutcome::Absent);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff.delay(attempt);
                    tracing::warn!(%identity, attempt, %err, "probe failed, retrying in {delay:?}");
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::warn!(%identity, attempt, %err, "probe failed");
                    return Err(err.into());
                }
            }
        }
    }

    /// Probes and requires the resource to exist.
    ///
    /// # Errors
    /// `AssertionMismatch` if the backend reports the resource absent, plus
    /// the probe errors of [`Self::probe`].
    pub async fn expect_found(&self, identity: &ResourceIdentity) -> Result<ObservedState> {
        match self.probe(identity).await? {
            ProbeOutcome::Found(state) => Ok(state),
            ProbeOutcome::Absent => Err(StepError::AssertionMismatch {
                field: identity.to_string(),
                expected: "resource present in backend".into(),
                actual: Some("absent".into()),
            }),
        }
    }
}
