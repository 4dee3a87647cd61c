//! Lifecycle steps and their executor.
//!
//! A step is an explicit sum type dispatched exhaustively below — not a
//! callback object — so the sequencer's behavior stays statically checkable
//! and failure reports can name what was running.

use crate::assertion::{self, AttrAssertion};
use crate::checker::{check_import_equivalence, check_no_drift};
use crate::error::{Result, StepError};
use crate::probe::StateProbe;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use veristate_backend::{
    DeclaredConfig, ObservedState, ProvisionError, Provisioner, ResourceIdentity,
};

/// One lifecycle operation within a case.
#[derive(Debug, Clone)]
pub enum Step {
    /// Converge remote state to a configuration, then probe the identity and
    /// evaluate the attribute assertions against what the backend reports.
    Apply {
        /// Configuration to converge to.
        config: DeclaredConfig,
        /// Assertions evaluated against probed state.
        assertions: Vec<AttrAssertion>,
    },
    /// Submit a configuration that the backend must reject with an error
    /// matching `pattern`. Silent success and unrecognizable errors are both
    /// failures.
    ApplyExpectError {
        /// Configuration expected to be rejected.
        config: DeclaredConfig,
        /// Error-signature pattern.
        pattern: Regex,
    },
    /// Re-plan the already-applied configuration and require an empty change
    /// set.
    PlanOnlyNoDrift {
        /// The configuration the most recent apply converged to.
        config: DeclaredConfig,
    },
    /// Re-derive state through the import path from the identity alone and
    /// require equality with the most recent apply, minus the allow-listed
    /// non-readable fields.
    Import {
        /// Fields the backend does not expose on read.
        allow_list: Vec<String>,
    },
}

impl Step {
    /// Apply step without assertions.
    #[must_use]
    pub fn apply(config: DeclaredConfig) -> Self {
        Self::Apply {
            config,
            assertions: Vec::new(),
        }
    }

    /// Apply step with attribute assertions.
    #[must_use]
    pub fn apply_with(config: DeclaredConfig, assertions: Vec<AttrAssertion>) -> Self {
        Self::Apply { config, assertions }
    }

    /// Apply step expected to fail with an error matching `pattern`.
    ///
    /// # Panics
    /// Panics if `pattern` is not a valid regex; step tables are authored
    /// with literal patterns, so this is a programming error.
    #[must_use]
    pub fn apply_expect_error(config: DeclaredConfig, pattern: &str) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid error pattern {pattern:?}: {e}"));
        Self::ApplyExpectError { config, pattern }
    }

    /// Plan-only step requiring zero proposed changes.
    #[must_use]
    pub fn plan_only_no_drift(config: DeclaredConfig) -> Self {
        Self::PlanOnlyNoDrift { config }
    }

    /// Import step with an explicit allow-list of non-readable fields.
    #[must_use]
    pub fn import(allow_list: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Import {
            allow_list: allow_list.into_iter().map(Into::into).collect(),
        }
    }

    /// The step's kind, for reports and logs.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Apply { .. } => StepKind::Apply,
            Self::ApplyExpectError { .. } => StepKind::ApplyExpectError,
            Self::PlanOnlyNoDrift { .. } => StepKind::PlanOnlyNoDrift,
            Self::Import { .. } => StepKind::Import,
        }
    }
}

/// Step discriminant used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Converge and assert.
    Apply,
    /// Converge, expecting rejection.
    ApplyExpectError,
    /// Dry-run, expecting no changes.
    PlanOnlyNoDrift,
    /// Re-derive state by identity.
    Import,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply => f.write_str("apply"),
            Self::ApplyExpectError => f.write_str("apply-expect-error"),
            Self::PlanOnlyNoDrift => f.write_str("plan-only-no-drift"),
            Self::Import => f.write_str("import"),
        }
    }
}

/// Executes steps for one case, carrying the cross-step memory the import
/// and plan checks need (the most recently applied state).
pub struct StepExecutor {
    provisioner: Arc<dyn Provisioner>,
    probe: StateProbe,
    last_applied: Option<ObservedState>,
}

impl StepExecutor {
    /// Creates an executor bound to one case's backend handles.
    pub fn new(provisioner: Arc<dyn Provisioner>, probe: StateProbe) -> Self {
        Self {
            provisioner,
            probe,
            last_applied: None,
        }
    }

    /// The state produced by the most recent successful apply, if any.
    #[must_use]
    pub fn last_applied(&self) -> Option<&ObservedState> {
        self.last_applied.as_ref()
    }

    /// Runs one step against the case identity.
    ///
    /// # Errors
    /// The first failure the step hits, per the taxonomy in
    /// [`StepError`].
    pub async fn execute(&mut self, identity: &ResourceIdentity, step: &Step) -> Result<()> {
        match step {
            Step::Apply { config, assertions } => self.apply(identity, config, assertions).await,
            Step::ApplyExpectError { config, pattern } => {
                self.apply_expect_error(config, pattern).await
            }
            Step::PlanOnlyNoDrift { config } => self.plan_only(config).await,
            Step::Import { allow_list } => self.import(identity, allow_list).await,
        }
    }

    async fn apply(
        &mut self,
        identity: &ResourceIdentity,
        config: &DeclaredConfig,
        assertions: &[AttrAssertion],
    ) -> Result<()> {
        let applied = self.provisioner.apply(config).await?;
        if !applied.identity.aliases(identity) {
            return Err(StepError::AssertionMismatch {
                field: "identity".into(),
                expected: identity.to_string(),
                actual: Some(applied.identity.to_string()),
            });
        }
        tracing::debug!(%identity, attrs = applied.state.len(), "apply converged");
        self.last_applied = Some(applied.state);

        let observed = self.probe.expect_found(identity).await?;
        assertion::check_all(assertions, &observed)
    }

    async fn apply_expect_error(&self, config: &DeclaredConfig, pattern: &Regex) -> Result<()> {
        match self.provisioner.apply(config).await {
            Ok(applied) => {
                tracing::warn!(identity = %applied.identity, "expected rejection, got convergence");
                Err(StepError::UnexpectedSuccess {
                    pattern: pattern.as_str().to_string(),
                })
            }
            Err(ProvisionError::Transport(msg)) => Err(StepError::Transport(msg)),
            Err(ProvisionError::Convergence(message)) => {
                if pattern.is_match(&message) {
                    tracing::debug!("backend rejected configuration with the expected signature");
                    Ok(())
                } else {
                    Err(StepError::ErrorSignatureMismatch {
                        pattern: pattern.as_str().to_string(),
                        actual: message,
                    })
                }
            }
        }
    }

    async fn plan_only(&self, config: &DeclaredConfig) -> Result<()> {
        let previous = self.last_applied.as_ref().ok_or_else(|| {
            StepError::InvalidSequence("plan-only-no-drift requires a preceding apply".into())
        })?;
        let changes = self.provisioner.plan(config, previous).await?;
        check_no_drift(changes)
    }

    async fn import(&self, identity: &ResourceIdentity, allow_list: &[String]) -> Result<()> {
        let applied = self.last_applied.as_ref().ok_or_else(|| {
            StepError::InvalidSequence("import requires a preceding apply".into())
        })?;
        let imported = self.provisioner.import_resource(identity).await?;
        let allow: Vec<&str> = allow_list.iter().map(String::as_str).collect();
        check_import_equivalence(applied, &imported, &allow)
    }
}
