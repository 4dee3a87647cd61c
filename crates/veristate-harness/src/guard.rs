//! Duplicate-creation guard.
//!
//! Declaring a second resource that aliases an already-managed remote
//! identity must fail with an error recognizable as "already exists, import
//! it instead" — not with an arbitrary validation error, and certainly not
//! silently. Cases match against the canonical signature built here rather
//! than hand-writing patterns that could drift.

/// Returns the error-signature pattern a backend must emit when a
/// declaration aliases an existing `kind` resource.
#[must_use]
pub fn requires_import_error(kind: &str) -> String {
    format!(
        "{} \"[^\"]+\" already exists(.|\\n)*needs to be imported",
        regex::escape(kind)
    )
}
