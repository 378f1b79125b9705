//! Laminar - Dependency-Cache Build Orchestrator
//!
//! Fingerprints a dependency manifest, reuses or builds a cached
//! dependencies-only compiled layer via placeholder source substitution,
//! and restores the build descriptor before the final build runs.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod placeholder;
pub mod store;
pub mod substitute;

pub use error::{LaminarError, LaminarResult};
