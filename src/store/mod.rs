//! File-backed cache store for compiled dependency layers
//!
//! One directory per cache key, holding the layer blob and a small metadata
//! file. Entries are immutable once created: `put` stages the entry in a
//! sibling directory and renames it into place, so the first writer wins and
//! later writers for the same key discard their blob without error. Removal
//! only happens through the explicit `cache clear` command.

use crate::error::{LaminarError, LaminarResult};
use crate::manifest::CacheKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Blob file name inside an entry directory
const BLOB_FILE: &str = "layer.blob";
/// Metadata file name inside an entry directory
const META_FILE: &str = "entry.toml";

/// A cached dependency layer
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key the entry is stored under
    pub key: CacheKey,
    /// Path to the compiled-dependency blob
    pub blob_path: PathBuf,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// Blob size in bytes
    pub size_bytes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    created_at: DateTime<Utc>,
    size_bytes: u64,
}

/// Keyed store of compiled dependency layers
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open a store rooted at the given directory.
    ///
    /// The directory is created lazily on first `put`; a missing directory
    /// is an ordinary empty store, not an error.
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Look up an entry by key.
    ///
    /// `Ok(None)` on a clean miss; `StoreUnavailable` when the backing
    /// medium cannot be read (callers degrade to a full rebuild).
    pub fn get(&self, key: &CacheKey) -> LaminarResult<Option<CacheEntry>> {
        let dir = self.entry_dir(key);
        if !dir.exists() {
            return Ok(None);
        }
        match self.read_entry(key, &dir) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => Err(LaminarError::store_unavailable(format!(
                "entry {} unreadable: {e}",
                key.short()
            ))),
        }
    }

    /// Store a blob under a key.
    ///
    /// First writer wins: if the key already exists, the new blob is
    /// discarded and the existing entry is returned unchanged.
    pub fn put(&self, key: &CacheKey, blob: &[u8]) -> LaminarResult<CacheEntry> {
        let dir = self.entry_dir(key);
        if dir.exists() {
            debug!("Cache entry {} already present, keeping first write", key.short());
            return self
                .get(key)?
                .ok_or_else(|| LaminarError::store_unavailable("entry vanished during put"));
        }

        fs::create_dir_all(&self.root).map_err(|e| {
            LaminarError::store_unavailable(format!(
                "cannot create cache root {}: {e}",
                self.root.display()
            ))
        })?;

        let stage = self.root.join(format!(".stage-{}-{}", std::process::id(), stage_nonce()));
        let meta = EntryMeta {
            created_at: Utc::now(),
            size_bytes: blob.len() as u64,
        };

        let staged = (|| -> std::io::Result<()> {
            fs::create_dir(&stage)?;
            fs::write(stage.join(BLOB_FILE), blob)?;
            let meta_toml = toml::to_string_pretty(&meta)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            fs::write(stage.join(META_FILE), meta_toml)?;
            Ok(())
        })();
        if let Err(e) = staged {
            let _ = fs::remove_dir_all(&stage);
            return Err(LaminarError::store_unavailable(format!("staging entry: {e}")));
        }

        match fs::rename(&stage, &dir) {
            Ok(()) => {
                debug!("Cached dependency layer under {}", key.short());
            }
            Err(e) => {
                let _ = fs::remove_dir_all(&stage);
                if !dir.exists() {
                    return Err(LaminarError::store_unavailable(format!(
                        "committing entry {}: {e}",
                        key.short()
                    )));
                }
                // Lost the race; the winner's entry stands.
                debug!("Concurrent put for {}, discarding blob", key.short());
            }
        }

        self.get(key)?
            .ok_or_else(|| LaminarError::store_unavailable("entry vanished during put"))
    }

    /// List all entries in the store, newest first
    pub fn list(&self) -> LaminarResult<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let read_dir = fs::read_dir(&self.root).map_err(|e| {
            LaminarError::store_unavailable(format!("reading cache root {}: {e}", self.root.display()))
        })?;

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| LaminarError::store_unavailable(e.to_string()))?;
            let name = item.file_name();
            let Some(name) = name.to_str() else { continue };
            let Ok(key) = CacheKey::parse(name) else {
                // stage leftovers or foreign files
                continue;
            };
            match self.read_entry(&key, &item.path()) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable cache entry {}: {}", key.short(), e),
            }
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Find an entry by full key or unambiguous prefix
    pub fn find(&self, key_or_prefix: &str) -> LaminarResult<Option<CacheEntry>> {
        if let Ok(key) = CacheKey::parse(key_or_prefix) {
            return self.get(&key);
        }
        let matches: Vec<CacheEntry> = self
            .list()?
            .into_iter()
            .filter(|e| e.key.as_str().starts_with(key_or_prefix))
            .collect();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => Err(LaminarError::InvalidCacheKey(format!(
                "prefix '{key_or_prefix}' matches {n} entries"
            ))),
        }
    }

    /// Remove a single entry
    pub fn remove(&self, key: &CacheKey) -> LaminarResult<()> {
        let dir = self.entry_dir(key);
        if !dir.exists() {
            return Err(LaminarError::CacheEntryNotFound(key.short().to_string()));
        }
        fs::remove_dir_all(&dir).map_err(|e| {
            LaminarError::store_unavailable(format!("removing entry {}: {e}", key.short()))
        })
    }

    /// Remove every entry in the store
    pub fn clear(&self) -> LaminarResult<usize> {
        let entries = self.list()?;
        let mut removed = 0;
        for entry in &entries {
            self.remove(&entry.key)?;
            removed += 1;
        }
        Ok(removed)
    }

    fn read_entry(&self, key: &CacheKey, dir: &Path) -> LaminarResult<CacheEntry> {
        let meta_path = dir.join(META_FILE);
        let blob_path = dir.join(BLOB_FILE);

        let meta_content = fs::read_to_string(&meta_path)
            .map_err(|e| LaminarError::io(format!("reading {}", meta_path.display()), e))?;
        let meta: EntryMeta = toml::from_str(&meta_content)?;

        if !blob_path.exists() {
            return Err(LaminarError::PathNotFound(blob_path));
        }

        Ok(CacheEntry {
            key: key.clone(),
            blob_path,
            created_at: meta.created_at,
            size_bytes: meta.size_bytes,
        })
    }
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn stage_nonce() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
