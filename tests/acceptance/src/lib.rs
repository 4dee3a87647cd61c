//! Acceptance scenarios for the veristate lifecycle harness.
//!
//! This crate exercises the full engine against a deterministic in-memory
//! provisioning backend (a simulated message-bus namespace service):
//!
//! 1. **Lifecycle** - create, update, re-plan, destroy-verify
//! 2. **Import** - re-derive state by identity and compare
//! 3. **Duplicate creation** - aliasing declarations must be rejected
//! 4. **Credentials** - generated secrets match structure, never collide
//!
//! The scenario tables live under `tests/`; this library carries the shared
//! fixtures, the simulated backend, and the configuration templates.

pub mod sim;

pub use fixtures::TestData;
pub use sim::{SimBus, BUS_NAMESPACE_KIND, NON_READABLE_FIELDS};
