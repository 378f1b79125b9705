//! Placeholder compilation units
//!
//! A placeholder is a minimal, syntactically valid stand-in for the real
//! compilation unit. Building the project against it compiles every
//! dependency without touching real application source, so the resulting
//! layer is cacheable independently of source edits.

use crate::error::{LaminarError, LaminarResult};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Kinds of build targets a placeholder can be synthesized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetKind {
    /// Executable with an entry point
    Binary,
    /// Library with no entry point
    Library,
    /// Procedural macro crate (cannot be stubbed)
    ProcMacro,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Binary => "binary",
            Self::Library => "library",
            Self::ProcMacro => "proc-macro",
        };
        write!(f, "{}", name)
    }
}

impl TargetKind {
    /// Stub source for this target kind, if one exists
    fn stub_source(&self) -> Option<&'static str> {
        match self {
            Self::Binary => Some("fn main() {}\n"),
            Self::Library => Some("// dependencies-only build stub\n"),
            // A macro crate's exports are part of its dependents' builds;
            // an empty stub would change what gets compiled downstream.
            Self::ProcMacro => None,
        }
    }

    /// File name for the stub unit
    fn stub_file_name(&self) -> &'static str {
        match self {
            Self::Binary => "placeholder_main.rs",
            Self::Library | Self::ProcMacro => "placeholder_lib.rs",
        }
    }
}

/// A materialized placeholder unit.
///
/// Owns the transient directory holding the stub; the file is removed when
/// the unit is dropped.
#[derive(Debug)]
pub struct PlaceholderUnit {
    /// Target kind the stub satisfies
    pub kind: TargetKind,
    /// Path to the stub file
    path: PathBuf,
    _dir: TempDir,
}

impl PlaceholderUnit {
    /// Path of the stub file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Materialize a placeholder unit for the given target kind.
///
/// The stub is written outside the real source tree, into a transient
/// directory owned by the returned unit.
pub fn project(kind: TargetKind) -> LaminarResult<PlaceholderUnit> {
    let source = kind.stub_source().ok_or_else(|| LaminarError::UnsupportedTargetKind {
        kind: kind.to_string(),
        reason: "no safe placeholder exists for this target".to_string(),
    })?;

    let dir = TempDir::new().map_err(|e| LaminarError::io("creating placeholder directory", e))?;
    let path = dir.path().join(kind.stub_file_name());
    std::fs::write(&path, source)
        .map_err(|e| LaminarError::io(format!("writing placeholder {}", path.display()), e))?;

    debug!("Placeholder {} unit at {}", kind, path.display());
    Ok(PlaceholderUnit {
        kind,
        path,
        _dir: dir,
    })
}
