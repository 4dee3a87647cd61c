//! Case sequencing.
//!
//! A case's steps run strictly in order; the first failure short-circuits
//! the rest. Whatever happens — success, failure, cancellation — the case
//! ends with exactly one destroy-verification attempt, and its outcome is
//! merged into the report beside (never instead of) the original failure.

use crate::error::StepError;
use crate::probe::{ProbeOutcome, RetryPolicy, StateProbe};
use crate::report::{CaseReport, CaseVerdict, CleanupOutcome, FailedStage, StepFailure};
use crate::step::{Step, StepExecutor};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use veristate_backend::{Provisioner, RemoteClient, ResourceIdentity};

/// Per-case execution options.
#[derive(Debug, Clone)]
pub struct CaseOptions {
    /// Deadline for each individual step, destroy-verification included.
    pub step_deadline: Duration,
    /// Retry policy handed to the probe.
    pub retry: RetryPolicy,
}

impl Default for CaseOptions {
    fn default() -> Self {
        Self {
            step_deadline: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

/// One scenario: an identity and the ordered steps to run against it.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Case name, used in reports and logs.
    pub name: String,
    /// Identity every remote call is addressed by. Fixed at construction.
    pub identity: ResourceIdentity,
    /// Ordered steps.
    pub steps: Vec<Step>,
    /// Execution options.
    pub options: CaseOptions,
}

impl TestCase {
    /// Creates a case with default options.
    #[must_use]
    pub fn new(name: impl Into<String>, identity: ResourceIdentity, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            identity,
            steps,
            options: CaseOptions::default(),
        }
    }

    /// Replaces the execution options.
    #[must_use]
    pub fn with_options(mut self, options: CaseOptions) -> Self {
        self.options = options;
        self
    }
}

/// Sequencer state, advanced as a case runs.
///
/// `Pending -> Running(i) -> { Running(i+1) | Failed(i) | Completed }`,
/// then unconditionally `DestroyVerifying -> Destroyed | DestroyFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    /// No step has started.
    Pending,
    /// Step `i` is executing.
    Running(usize),
    /// Every step completed.
    Completed,
    /// Step `i` failed; remaining steps were skipped.
    Failed(usize),
    /// Destroy-verification is executing.
    DestroyVerifying,
    /// Destroy-verification confirmed absence.
    Destroyed,
    /// Destroy-verification failed.
    DestroyFailed,
}

impl CaseState {
    /// Returns true for states no transition leaves.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Destroyed | Self::DestroyFailed)
    }

    /// State name for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running(_) => "running",
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
            Self::DestroyVerifying => "destroy-verifying",
            Self::Destroyed => "destroyed",
            Self::DestroyFailed => "destroy-failed",
        }
    }
}

/// Executes cases against explicitly passed backend handles.
///
/// The runner owns no global client state; clones of the same handles can
/// drive any number of concurrently running cases, since cases share
/// nothing mutable.
pub struct CaseRunner {
    provisioner: Arc<dyn Provisioner>,
    remote: Arc<dyn RemoteClient>,
    cancel: CancellationToken,
}

impl CaseRunner {
    /// Creates a runner over the given backend handles.
    pub fn new(provisioner: Arc<dyn Provisioner>, remote: Arc<dyn RemoteClient>) -> Self {
        Self {
            provisioner,
            remote,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token (process-level timeout or
    /// interrupt).
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn transition(case: &TestCase, state: &mut CaseState, next: CaseState) {
        tracing::trace!(case = %case.name, from = state.as_str(), to = next.as_str(), "state transition");
        *state = next;
    }

    /// Runs one case to its terminal state and reports the merged outcome.
    pub async fn run(&self, case: &TestCase) -> CaseReport {
        let started_at = Utc::now();
        let mut state = CaseState::Pending;
        let mut executor = StepExecutor::new(
            self.provisioner.clone(),
            StateProbe::new(self.remote.clone(), case.options.retry.clone()),
        );
        let mut failure: Option<StepFailure> = None;
        let mut steps_completed = 0usize;
        let mut cancelled = false;

        tracing::info!(case = %case.name, identity = %case.identity, steps = case.steps.len(), "case starting");

        for (index, step) in case.steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            Self::transition(case, &mut state, CaseState::Running(index));
            tracing::debug!(case = %case.name, index, kind = %step.kind(), "step starting");

            let step_result = tokio::select! {
                () = self.cancel.cancelled() => Err(StepError::Cancelled),
                result = tokio::time::timeout(
                    case.options.step_deadline,
                    executor.execute(&case.identity, step),
                ) => match result {
                    Ok(inner) => inner,
                    Err(_) => Err(StepError::DeadlineExceeded(case.options.step_deadline)),
                },
            };

            match step_result {
                Ok(()) => {
                    steps_completed += 1;
                    tracing::debug!(case = %case.name, index, "step passed");
                }
                Err(StepError::Cancelled) => {
                    tracing::warn!(case = %case.name, index, "case cancelled mid-step");
                    cancelled = true;
                    break;
                }
                Err(error) => {
                    tracing::warn!(case = %case.name, index, %error, "step failed, aborting remaining steps");
                    Self::transition(case, &mut state, CaseState::Failed(index));
                    failure = Some(StepFailure {
                        stage: FailedStage::Step {
                            index,
                            kind: step.kind(),
                        },
                        error,
                    });
                    break;
                }
            }
        }

        if failure.is_none() && !cancelled {
            Self::transition(case, &mut state, CaseState::Completed);
        }

        // Exactly one destroy-verification attempt, on every path. A
        // cancelled case still gets the best-effort attempt, but is
        // reported as cleanup-incomplete because cancellation hit before
        // this stage started.
        Self::transition(case, &mut state, CaseState::DestroyVerifying);
        tracing::debug!(case = %case.name, "destroy-verification starting");
        let cleanup = self.destroy_verify(case).await;

        let terminal = if cleanup.is_verified() {
            CaseState::Destroyed
        } else {
            CaseState::DestroyFailed
        };
        Self::transition(case, &mut state, terminal);
        debug_assert!(state.is_terminal());

        let verdict = if cancelled {
            CaseVerdict::CleanupIncomplete
        } else if failure.is_some() || !cleanup.is_verified() {
            CaseVerdict::Failed
        } else {
            CaseVerdict::Passed
        };

        let report = CaseReport {
            case: case.name.clone(),
            verdict,
            steps_completed,
            failure,
            cleanup,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(case = %case.name, state = state.as_str(), "{}", report.summary());
        report
    }

    /// Destroys the case's resource and requires a probe to confirm
    /// absence. Found and probe errors both fail verification: an outage
    /// must never be read as "gone".
    async fn destroy_verify(&self, case: &TestCase) -> CleanupOutcome {
        let probe = StateProbe::new(self.remote.clone(), case.options.retry.clone());
        let verification = async {
            self.provisioner.destroy(&case.identity).await?;
            match probe.probe(&case.identity).await? {
                ProbeOutcome::Absent => Ok(()),
                ProbeOutcome::Found(_) => Err(StepError::AssertionMismatch {
                    field: case.identity.to_string(),
                    expected: "absent after destroy".into(),
                    actual: Some("still present".into()),
                }),
            }
        };
        match tokio::time::timeout(case.options.step_deadline, verification).await {
            Ok(Ok(())) => CleanupOutcome::Verified,
            Ok(Err(error)) => {
                tracing::warn!(case = %case.name, %error, "destroy-verification failed");
                CleanupOutcome::Failed(error)
            }
            Err(_) => CleanupOutcome::Failed(StepError::DeadlineExceeded(
                case.options.step_deadline,
            )),
        }
    }
}
