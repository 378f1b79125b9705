//! Content-addressed cache keys for dependency manifests
//!
//! The key is a SHA-256 digest over a normalized rendering of the manifest,
//! so formatting, key order, and whitespace in the source file never
//! invalidate the cache. Same dependencies = same key.

use crate::error::{LaminarError, LaminarResult};
use crate::manifest::Manifest;
use sha2::{Digest, Sha256};
use std::fmt;

/// Display length for abbreviated keys
const SHORT_LEN: usize = 12;

/// Fixed-width cache key derived from normalized manifest content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Parse a key from its full 64-char hex form
    pub fn parse(s: &str) -> LaminarResult<Self> {
        if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            Ok(Self(s.to_string()))
        } else {
            Err(LaminarError::InvalidCacheKey(s.to_string()))
        }
    }

    /// Full 64-char hex form, used for cache addressing
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display
    pub fn short(&self) -> &str {
        &self.0[..SHORT_LEN]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render the manifest in its canonical form.
///
/// One `name<SP>req` line per dependency (sorted by name), followed by one
/// `name<SP>=<SP>version` line per lock entry (sorted by name). Requirements
/// render through `semver::VersionReq`, which canonicalizes their spelling.
pub fn normalize(manifest: &Manifest) -> String {
    let mut out = String::new();
    for dep in &manifest.dependencies {
        out.push_str(&dep.name);
        out.push(' ');
        out.push_str(&dep.req.to_string());
        out.push('\n');
    }
    for (name, version) in &manifest.locks {
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&version.to_string());
        out.push('\n');
    }
    out
}

/// Compute the cache key for a manifest
pub fn fingerprint(manifest: &Manifest) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(normalize(manifest).as_bytes());
    CacheKey(hex::encode(hasher.finalize()))
}
