//! Equivalence checks for import and plan-only steps.

use crate::error::{Result, StepError};
use veristate_backend::{ChangeSet, ObservedState};

/// Requires the import-derived state to equal the applied state
/// field-for-field, minus the allow-listed non-readable fields.
///
/// The allow-list is explicit: fields the backend does not expose on read
/// (secrets, write-only fields) must be named by the case, never silently
/// ignored. Any other divergence — including a field present on only one
/// side — is a hard failure naming the field and both values.
///
/// # Errors
/// `ImportMismatch` carrying every diverging field.
pub fn check_import_equivalence(
    applied: &ObservedState,
    imported: &ObservedState,
    allow_list: &[&str],
) -> Result<()> {
    let diffs = applied.diff(imported, allow_list);
    if diffs.is_empty() {
        return Ok(());
    }
    Err(StepError::ImportMismatch(diffs))
}

/// Requires a dry-run plan to propose zero changes.
///
/// A non-empty change set right after a successful apply means the backend
/// accepted a value it cannot reproduce on read — the classic
/// normalization regression (e.g. `basic` accepted on write, `Basic`
/// returned on read, diff proposed forever after).
///
/// # Errors
/// `Drift` carrying the full change set for diagnosis.
pub fn check_no_drift(changes: ChangeSet) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }
    Err(StepError::Drift(changes))
}
