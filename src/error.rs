//! Error types for Laminar
//!
//! All modules use `LaminarResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Laminar operations
pub type LaminarResult<T> = Result<T, LaminarError>;

/// All errors that can occur in Laminar
#[derive(Error, Debug)]
pub enum LaminarError {
    // Manifest errors
    #[error("Invalid manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Manifest file not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Invalid lockfile at {path}: {reason}")]
    InvalidLockfile { path: PathBuf, reason: String },

    // Placeholder errors
    #[error("Unsupported target kind: {kind}. {reason}")]
    UnsupportedTargetKind { kind: String, reason: String },

    // Substitution errors
    #[error("Substitution target '{pattern}' not found in descriptor {path}")]
    SubstitutionTargetNotFound { pattern: String, path: PathBuf },

    #[error("Descriptor not found: {0}")]
    DescriptorNotFound(PathBuf),

    #[error("Invalid descriptor at {path}: {reason}")]
    DescriptorInvalid { path: PathBuf, reason: String },

    // Cache store errors
    #[error("Cache store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("Cache entry not found: {0}")]
    CacheEntryNotFound(String),

    #[error("Invalid cache key: {0}")]
    InvalidCacheKey(String),

    // Dependency build errors
    #[error("Dependency build failed: {command}, exit code {code}\n{stderr}")]
    DependencyBuildFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Dependency compiler could not be spawned: {command}")]
    CompilerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dependency compiler produced no artifact at {0}")]
    ArtifactMissing(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl LaminarError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store-unavailable error
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether the orchestrator may absorb this error and degrade to a
    /// full, uncached rebuild instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidManifest { .. } => {
                Some("Fix the manifest: each dependency needs a valid semver requirement")
            }
            Self::SubstitutionTargetNotFound { .. } => {
                Some("The descriptor no longer references the expected compilation unit; check --unit")
            }
            Self::StoreUnavailable { .. } => {
                Some("Check permissions on the cache directory, or override with --cache-dir")
            }
            Self::UnsupportedTargetKind { .. } => {
                Some("Only binary and library targets can be stubbed; build this target uncached")
            }
            _ => None,
        }
    }
}
