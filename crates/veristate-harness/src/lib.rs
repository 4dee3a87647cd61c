//! # veristate-harness
//!
//! Lifecycle verification engine for declaratively-managed resources.
//!
//! A [`TestCase`] is an ordered list of [`Step`]s run against a provisioning
//! backend: apply a configuration, expect an apply to fail, re-plan and
//! require no drift, or re-import by identity. The [`CaseRunner`] executes
//! the steps strictly in order, short-circuits on the first failure, and
//! always finishes with destroy-verification, whatever happened before.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   CaseRunner                     │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────────┐  │
//! │  │StepExecutor│ │ StateProbe │ │  Checkers    │  │
//! │  └─────┬──────┘ └─────┬──────┘ └──────────────┘  │
//! └────────┼──────────────┼──────────────────────────┘
//!          ▼              ▼
//!    dyn Provisioner  dyn RemoteClient
//! ```
//!
//! Both backend handles are passed in explicitly; the engine holds no global
//! client state and persists nothing between steps — all state lives in the
//! remote backend.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod assertion;
pub mod case;
pub mod checker;
pub mod error;
pub mod guard;
pub mod probe;
pub mod report;
pub mod step;


pub use assertion::{AttrAssertion, Expectation};
pub use case::{CaseOptions, CaseRunner, CaseState, TestCase};
pub use checker::{check_import_equivalence, check_no_drift};
pub use error::{Result, StepError};
pub use guard::requires_import_error;
pub use probe::{BackoffStrategy, ProbeOutcome, RetryPolicy, StateProbe};
pub use report::{CaseReport, CaseVerdict, CleanupOutcome, FailedStage, StepFailure};
pub use step::{Step, StepExecutor, StepKind};
