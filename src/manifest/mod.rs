//! Dependency manifest model and parsing
//!
//! A manifest is a TOML file with a `[dependencies]` table mapping names to
//! semver requirements, optionally accompanied by a lockfile of exact
//! `[[package]]` resolutions. The manifest content fully determines the
//! dependency layer's cache key.

pub mod fingerprint;

pub use fingerprint::{fingerprint, CacheKey};

use crate::error::{LaminarError, LaminarResult};
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Dependency name
    pub name: String,
    /// Version requirement
    pub req: VersionReq,
}

/// Parsed dependency manifest
///
/// Dependencies are held sorted by name so two manifests with the same
/// declarations always compare and fingerprint identically regardless of
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Declared dependencies, sorted by name
    pub dependencies: Vec<Dependency>,
    /// Exact resolutions from the lockfile, keyed by name
    pub locks: BTreeMap<String, Version>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    dependencies: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawLockfile {
    #[serde(default)]
    package: Vec<RawLockPackage>,
}

#[derive(Debug, Deserialize)]
struct RawLockPackage {
    name: String,
    version: String,
}

impl Manifest {
    /// Load a manifest from disk, with an optional explicit lockfile.
    ///
    /// When no lockfile is given, a sibling file with the `lock` extension
    /// (`deps.toml` -> `deps.lock`, `Cargo.toml` -> `Cargo.lock`) is used if
    /// it exists.
    pub async fn load(manifest_path: &Path, lockfile: Option<&Path>) -> LaminarResult<Self> {
        if !manifest_path.exists() {
            return Err(LaminarError::ManifestNotFound(manifest_path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(manifest_path).await.map_err(|e| {
            LaminarError::io(format!("reading manifest {}", manifest_path.display()), e)
        })?;
        let mut manifest = Self::parse(&content, manifest_path)?;

        let lock_path = match lockfile {
            Some(path) => Some(path.to_path_buf()),
            None => discover_lockfile(manifest_path),
        };

        if let Some(path) = lock_path {
            debug!("Using lockfile: {}", path.display());
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| LaminarError::io(format!("reading lockfile {}", path.display()), e))?;
            manifest.locks = parse_lockfile(&content, &path)?;
        }

        Ok(manifest)
    }

    /// Parse a manifest from a TOML string
    pub fn parse(content: &str, path: &Path) -> LaminarResult<Self> {
        let raw: RawManifest = toml::from_str(content).map_err(|e| LaminarError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for (name, value) in &raw.dependencies {
            let req_str = dependency_requirement(value).ok_or_else(|| {
                LaminarError::InvalidManifest {
                    path: path.to_path_buf(),
                    reason: format!("dependency '{name}' has no version requirement"),
                }
            })?;
            let req = VersionReq::parse(req_str).map_err(|e| LaminarError::InvalidManifest {
                path: path.to_path_buf(),
                reason: format!("dependency '{name}': {e}"),
            })?;
            dependencies.push(Dependency {
                name: name.clone(),
                req,
            });
        }
        dependencies.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            dependencies,
            locks: BTreeMap::new(),
        })
    }

    /// Whether the manifest declares no dependencies
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Extract the requirement string from a dependency value.
///
/// Accepts either a bare string (`libfoo = "1.2"`) or a table with a
/// `version` key (`libfoo = { version = "1.2" }`).
fn dependency_requirement(value: &toml::Value) -> Option<&str> {
    match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
        _ => None,
    }
}

/// Parse a lockfile's `[[package]]` entries into exact resolutions
fn parse_lockfile(content: &str, path: &Path) -> LaminarResult<BTreeMap<String, Version>> {
    let raw: RawLockfile = toml::from_str(content).map_err(|e| LaminarError::InvalidLockfile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut locks = BTreeMap::new();
    for pkg in raw.package {
        let version = Version::parse(&pkg.version).map_err(|e| LaminarError::InvalidLockfile {
            path: path.to_path_buf(),
            reason: format!("package '{}': {e}", pkg.name),
        })?;
        locks.insert(pkg.name, version);
    }
    Ok(locks)
}

/// Look for a sibling lockfile next to the manifest
fn discover_lockfile(manifest_path: &Path) -> Option<PathBuf> {
    let candidate = manifest_path.with_extension("lock");
    if candidate.exists() && candidate.is_file() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> LaminarResult<Manifest> {
        Manifest::parse(content, Path::new("deps.toml"))
    }

    #[test]
    fn parse_string_dependency() {
        let manifest = parse(r#"
            [dependencies]
            libfoo = "1.2.0"
        "#)
        .unwrap();

        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(manifest.dependencies[0].name, "libfoo");
        assert!(manifest.dependencies[0]
            .req
            .matches(&Version::parse("1.2.5").unwrap()));
    }

    #[test]
    fn parse_table_dependency() {
        let manifest = parse(r#"
            [dependencies]
            libbar = { version = ">=0.4, <0.6" }
        "#)
        .unwrap();

        assert_eq!(manifest.dependencies[0].name, "libbar");
    }

    #[test]
    fn dependencies_sorted_by_name() {
        let manifest = parse(r#"
            [dependencies]
            zlib = "1.0"
            alpha = "2.0"
            middle = "3.0"
        "#)
        .unwrap();

        let names: Vec<_> = manifest.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "middle", "zlib"]);
    }

    #[test]
    fn empty_manifest_parses() {
        let manifest = parse("").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn invalid_toml_rejected() {
        let err = parse("[dependencies").unwrap_err();
        assert!(matches!(err, LaminarError::InvalidManifest { .. }));
    }

    #[test]
    fn invalid_requirement_rejected() {
        let err = parse(r#"
            [dependencies]
            libfoo = "not-a-version"
        "#)
        .unwrap_err();
        assert!(matches!(err, LaminarError::InvalidManifest { .. }));
    }

    #[test]
    fn missing_version_in_table_rejected() {
        let err = parse(r#"
            [dependencies]
            libfoo = { optional = true }
        "#)
        .unwrap_err();
        assert!(matches!(err, LaminarError::InvalidManifest { .. }));
    }

    #[test]
    fn lockfile_parses_packages() {
        let locks = parse_lockfile(
            r#"
            [[package]]
            name = "libfoo"
            version = "1.2.3"

            [[package]]
            name = "libbar"
            version = "0.4.1"
            "#,
            Path::new("deps.lock"),
        )
        .unwrap();

        assert_eq!(locks.len(), 2);
        assert_eq!(locks["libfoo"], Version::parse("1.2.3").unwrap());
    }

    #[test]
    fn lockfile_bad_version_rejected() {
        let err = parse_lockfile(
            r#"
            [[package]]
            name = "libfoo"
            version = "one.two"
            "#,
            Path::new("deps.lock"),
        )
        .unwrap_err();
        assert!(matches!(err, LaminarError::InvalidLockfile { .. }));
    }
}
