//! Cache command - inspect and clear the dependency-layer store

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::{LaminarError, LaminarResult};
use crate::store::{format_bytes, CacheEntry, CacheStore};
use console::style;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct EntryView {
    key: String,
    created_at: String,
    size_bytes: u64,
    blob_path: String,
}

impl From<&CacheEntry> for EntryView {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            key: entry.key.as_str().to_string(),
            created_at: entry.created_at.to_rfc3339(),
            size_bytes: entry.size_bytes,
            blob_path: entry.blob_path.display().to_string(),
        }
    }
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> LaminarResult<()> {
    let cache_dir = args
        .cache_dir
        .clone()
        .or_else(|| config.cache.dir.clone())
        .unwrap_or_else(ConfigManager::default_cache_dir);
    let store = CacheStore::open(cache_dir);

    match args.action {
        CacheAction::List { format } => list(&store, format),
        CacheAction::Info { key } => info(&store, &key),
        CacheAction::Clear { key, yes } => clear(&store, key.as_deref(), yes),
    }
}

fn list(store: &CacheStore, format: OutputFormat) -> LaminarResult<()> {
    let entries = store.list()?;

    match format {
        OutputFormat::Json => {
            let views: Vec<EntryView> = entries.iter().map(EntryView::from).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.key);
            }
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No cached dependency layers in {}", store.root().display());
                return Ok(());
            }
            println!(
                "{:<14} {:<26} {:>10}",
                style("KEY").bold(),
                style("CREATED").bold(),
                style("SIZE").bold()
            );
            for entry in &entries {
                println!(
                    "{:<14} {:<26} {:>10}",
                    entry.key.short(),
                    entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    format_bytes(entry.size_bytes)
                );
            }
        }
    }
    Ok(())
}

fn info(store: &CacheStore, key: &str) -> LaminarResult<()> {
    let entry = store
        .find(key)?
        .ok_or_else(|| LaminarError::CacheEntryNotFound(key.to_string()))?;

    println!("{}  {}", style("Key:").bold(), entry.key);
    println!("{}  {}", style("Created:").bold(), entry.created_at.to_rfc3339());
    println!("{}  {}", style("Size:").bold(), format_bytes(entry.size_bytes));
    println!("{}  {}", style("Blob:").bold(), entry.blob_path.display());
    Ok(())
}

fn clear(store: &CacheStore, key: Option<&str>, yes: bool) -> LaminarResult<()> {
    match key {
        Some(key) => {
            let entry = store
                .find(key)?
                .ok_or_else(|| LaminarError::CacheEntryNotFound(key.to_string()))?;
            if !yes && !confirm(&format!("Remove cache entry {}?", entry.key.short()))? {
                println!("Aborted");
                return Ok(());
            }
            store.remove(&entry.key)?;
            println!("{} Removed {}", style("✓").green(), entry.key.short());
        }
        None => {
            let count = store.list()?.len();
            if count == 0 {
                println!("Cache is already empty");
                return Ok(());
            }
            if !yes && !confirm(&format!("Remove all {count} cache entries?"))? {
                println!("Aborted");
                return Ok(());
            }
            let removed = store.clear()?;
            println!("{} Removed {} entries", style("✓").green(), removed);
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> LaminarResult<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout()
        .flush()
        .map_err(|e| LaminarError::io("flushing stdout", e))?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|e| LaminarError::io("reading confirmation", e))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
