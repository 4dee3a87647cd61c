//! # veristate-backend
//!
//! Data model and backend interfaces for the veristate lifecycle harness.
//!
//! This crate defines what the harness talks *about* and who it talks *to*:
//!
//! - [`ResourceIdentity`]: the external key tuple addressing one remote object
//! - [`DeclaredConfig`]: an opaque declarative configuration blob
//! - [`ObservedState`]: the attribute set read back from a backend
//! - [`Provisioner`] / [`RemoteClient`]: the consumed backend capabilities
//!
//! The harness itself lives in `veristate-harness`; this crate carries no
//! sequencing logic so that backends and simulations can depend on it without
//! pulling in the engine.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod identity;
pub mod provisioner;
pub mod state;

pub use config::DeclaredConfig;
pub use error::{ProvisionError, RemoteError};
pub use identity::{NameGenerator, RandomSuffix, ResourceIdentity};
pub use provisioner::{Applied, Provisioner, RemoteClient};
pub use state::{ChangeSet, FieldDiff, ObservedState, PlannedChange};
