//! Build descriptor substitution
//!
//! Swaps the compilation-unit reference inside a build descriptor between
//! the real source and a placeholder, atomically and reversibly. A missing
//! reference is a hard error, never a silent no-op: a swallowed swap would
//! let the final build compile against the placeholder.

mod structured;
mod text;

pub use structured::TomlSubstitutor;
pub use text::TextSubstitutor;

use crate::error::{LaminarError, LaminarResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptor file formats with a substitution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    /// Structured TOML document (e.g. Cargo.toml); edits preserve layout
    Toml,
    /// Opaque text; substring substitution
    Text,
}

impl DescriptorFormat {
    /// Pick a format from the descriptor's file extension
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Text,
        }
    }
}

/// Outcome of a content-level swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Swap {
    /// Reference found and rewritten
    Applied(String),
    /// Descriptor already references the target; nothing to do
    AlreadyApplied,
}

/// Content-level substitution failure, mapped to `LaminarError` with the
/// descriptor path by [`BuildDescriptor::swap`]
#[derive(Debug)]
pub enum SwapError {
    /// Neither `from` nor `to` appears in the descriptor
    TargetNotFound,
    /// Descriptor could not be interpreted in this format
    Invalid(String),
}

/// Substitution strategy for one descriptor format
pub trait Substitutor: Send + Sync {
    /// Rewrite every reference to `from` into `to`.
    ///
    /// Idempotent: content already referencing `to` (with no remaining
    /// `from`) yields `Swap::AlreadyApplied`.
    fn swap(&self, content: &str, from: &str, to: &str) -> Result<Swap, SwapError>;
}

/// Select the substitutor for a descriptor format
pub fn substitutor_for(format: DescriptorFormat) -> Box<dyn Substitutor> {
    match format {
        DescriptorFormat::Toml => Box::new(TomlSubstitutor),
        DescriptorFormat::Text => Box::new(TextSubstitutor),
    }
}

/// A build descriptor on disk
///
/// Owned exclusively by one build session; swaps replace the file
/// atomically so a concurrent reader never observes a partial rewrite.
#[derive(Debug, Clone)]
pub struct BuildDescriptor {
    path: PathBuf,
    format: DescriptorFormat,
}

impl BuildDescriptor {
    /// Open a descriptor, detecting its format from the file extension
    pub fn open(path: &Path) -> LaminarResult<Self> {
        if !path.exists() {
            return Err(LaminarError::DescriptorNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            format: DescriptorFormat::detect(path),
        })
    }

    /// Descriptor file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected format
    pub fn format(&self) -> DescriptorFormat {
        self.format
    }

    /// Current descriptor bytes
    pub async fn read(&self) -> LaminarResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LaminarError::io(format!("reading descriptor {}", self.path.display()), e))
    }

    /// Swap the compilation-unit reference from `from` to `to`.
    ///
    /// The file is either fully rewritten or left untouched; the rewrite
    /// goes through a temp file in the same directory plus a rename.
    pub async fn swap(&self, from: &str, to: &str) -> LaminarResult<()> {
        let content = self.read().await?;
        if let Some(updated) = self.apply(&content, from, to)? {
            self.write_atomic(&updated)?;
            debug!("Swapped '{}' -> '{}' in {}", from, to, self.path.display());
        } else {
            debug!("Descriptor {} already references '{}'", self.path.display(), to);
        }
        Ok(())
    }

    /// Blocking variant of [`swap`], for drop-time restoration where an
    /// async context is not available.
    pub fn swap_sync(&self, from: &str, to: &str) -> LaminarResult<()> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| LaminarError::io(format!("reading descriptor {}", self.path.display()), e))?;
        if let Some(updated) = self.apply(&content, from, to)? {
            self.write_atomic(&updated)?;
            debug!("Swapped '{}' -> '{}' in {}", from, to, self.path.display());
        }
        Ok(())
    }

    /// Check that the descriptor references the given compilation unit,
    /// without rewriting anything.
    pub async fn verify_references(&self, unit: &str) -> LaminarResult<()> {
        let content = self.read().await?;
        match substitutor_for(self.format).swap(&content, unit, unit) {
            Ok(_) => Ok(()),
            Err(e) => Err(self.map_swap_err(e, unit)),
        }
    }

    fn apply(&self, content: &str, from: &str, to: &str) -> LaminarResult<Option<String>> {
        match substitutor_for(self.format).swap(content, from, to) {
            Ok(Swap::Applied(updated)) => Ok(Some(updated)),
            Ok(Swap::AlreadyApplied) => Ok(None),
            Err(e) => Err(self.map_swap_err(e, from)),
        }
    }

    fn map_swap_err(&self, err: SwapError, pattern: &str) -> LaminarError {
        match err {
            SwapError::TargetNotFound => LaminarError::SubstitutionTargetNotFound {
                pattern: pattern.to_string(),
                path: self.path.clone(),
            },
            SwapError::Invalid(reason) => LaminarError::DescriptorInvalid {
                path: self.path.clone(),
                reason,
            },
        }
    }

    fn write_atomic(&self, content: &str) -> LaminarResult<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| LaminarError::io("creating descriptor temp file", e))?;
        std::fs::write(tmp.path(), content)
            .map_err(|e| LaminarError::io("writing descriptor temp file", e))?;
        tmp.persist(&self.path).map_err(|e| {
            LaminarError::io(
                format!("replacing descriptor {}", self.path.display()),
                e.error,
            )
        })?;
        Ok(())
    }
}
