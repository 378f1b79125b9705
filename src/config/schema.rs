//! Configuration schema for Laminar
//!
//! Configuration is stored at `~/.config/laminar/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache store settings
    pub cache: CacheConfig,

    /// Dependency build settings
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Cache store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse cached dependency layers (default: true); disabling acts
    /// like a permanent cache miss
    pub enabled: bool,

    /// Override the cache store location (default: platform cache dir)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Dependency build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Dependency compiler command and arguments
    pub compiler: Vec<String>,

    /// Artifact path the compiler leaves behind, relative to the
    /// descriptor's directory
    pub artifact: PathBuf,

    /// Compilation-unit reference the descriptor uses for real sources
    pub unit: String,

    /// Extra environment variables for the compiler process
    pub env: HashMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: vec![
                "cargo".to_string(),
                "build".to_string(),
                "--release".to_string(),
            ],
            artifact: PathBuf::from("target/deps.layer"),
            unit: "src/main.rs".to_string(),
            env: HashMap::new(),
        }
    }
}
