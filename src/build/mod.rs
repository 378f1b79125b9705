//! Two-phase build orchestration
//!
//! Sequences fingerprinting, cache lookup, the placeholder dependency
//! build, and source restoration around an external dependency compiler.

mod compiler;
mod orchestrator;

pub use compiler::{CompiledLayer, DependencyCompiler, ProcessCompiler};
pub use orchestrator::{BuildOutcome, BuildRequest, Orchestrator, Phase};
