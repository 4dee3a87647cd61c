//! Case verdicts and failure reports.

use crate::error::StepError;
use crate::step::StepKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final verdict for one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseVerdict {
    /// Every step completed and destroy-verification confirmed absence.
    Passed,
    /// A step or destroy-verification failed.
    Failed,
    /// The case was cancelled before destroy-verification started; the
    /// remote object may have leaked even if the best-effort destroy
    /// attempt succeeded afterwards.
    CleanupIncomplete,
}

impl std::fmt::Display for CaseVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed => f.write_str("failed"),
            Self::CleanupIncomplete => f.write_str("cleanup incomplete"),
        }
    }
}

/// Which stage of a case failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailedStage {
    /// A numbered step.
    Step {
        /// Zero-based step index.
        index: usize,
        /// What the step was doing.
        kind: StepKind,
    },
    /// The mandatory destroy-verification stage.
    DestroyVerification,
}

impl std::fmt::Display for FailedStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Step { index, kind } => write!(f, "step {index} ({kind})"),
            Self::DestroyVerification => f.write_str("destroy-verification"),
        }
    }
}

/// The first failure a case hit.
#[derive(Debug, Clone)]
pub struct StepFailure {
    /// Stage that failed.
    pub stage: FailedStage,
    /// The error it failed with.
    pub error: StepError,
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

/// Outcome of the mandatory destroy-verification stage.
#[derive(Debug, Clone)]
pub enum CleanupOutcome {
    /// Destroy completed and the probe confirmed absence.
    Verified,
    /// Destroy or the post-destroy probe failed. Reported beside the
    /// original step failure, never instead of it.
    Failed(StepError),
}

impl CleanupOutcome {
    /// Returns true if the remote object is confirmed gone.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// The merged result of one case: step outcome plus cleanup outcome.
#[derive(Debug, Clone)]
pub struct CaseReport {
    /// Case name.
    pub case: String,
    /// Final verdict.
    pub verdict: CaseVerdict,
    /// Steps that completed before the case ended.
    pub steps_completed: usize,
    /// First step failure, if any.
    pub failure: Option<StepFailure>,
    /// Destroy-verification outcome.
    pub cleanup: CleanupOutcome,
    /// When the case started.
    pub started_at: DateTime<Utc>,
    /// When the case finished, cleanup included.
    pub finished_at: DateTime<Utc>,
}

impl CaseReport {
    /// Returns true only for Completed + Destroyed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == CaseVerdict::Passed
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.failure, &self.cleanup) {
            (None, CleanupOutcome::Verified) => format!("{}: {}", self.case, self.verdict),
            (Some(failure), CleanupOutcome::Verified) => {
                format!("{}: {} ({failure})", self.case, self.verdict)
            }
            (None, CleanupOutcome::Failed(err)) => {
                format!("{}: {} (destroy-verification: {err})", self.case, self.verdict)
            }
            (Some(failure), CleanupOutcome::Failed(err)) => format!(
                "{}: {} ({failure}; destroy-verification also failed: {err})",
                self.case, self.verdict
            ),
        }
    }
}
