//! CLI argument definitions using clap derive

use crate::placeholder::TargetKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Laminar - Dependency-Cache Build Orchestrator
///
/// Builds and reuses a cached dependencies-only compile layer keyed by
/// the dependency manifest, swapping a placeholder source in and out of
/// the build descriptor around the dependency build.
#[derive(Parser, Debug)]
#[command(name = "laminar")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LAMINAR_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or reuse the cached dependency layer, then restore sources
    Build(BuildArgs),

    /// Print the cache key for a manifest
    Fingerprint(FingerprintArgs),

    /// Manage the dependency-layer cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Dependency manifest path
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Build descriptor path
    #[arg(short, long)]
    pub descriptor: PathBuf,

    /// Build target kind to synthesize a placeholder for
    #[arg(short, long, value_enum)]
    pub target_kind: TargetKind,

    /// Explicit lockfile path (default: sibling .lock file if present)
    #[arg(long)]
    pub lockfile: Option<PathBuf>,

    /// Override the cache store location
    #[arg(long, env = "LAMINAR_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Bypass the cache lookup and rebuild the dependency layer
    #[arg(long)]
    pub force_rebuild: bool,

    /// Compilation-unit reference the descriptor uses for real sources
    #[arg(long)]
    pub unit: Option<String>,

    /// Artifact path the dependency compiler leaves behind
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// Dependency compiler command override (defaults to config)
    #[arg(last = true)]
    pub compiler: Vec<String>,
}

/// Arguments for the fingerprint command
#[derive(Parser, Debug)]
pub struct FingerprintArgs {
    /// Dependency manifest path
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Explicit lockfile path (default: sibling .lock file if present)
    #[arg(long)]
    pub lockfile: Option<PathBuf>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Override the cache store location
    #[arg(long, env = "LAMINAR_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List all cached dependency layers
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show details for one cache entry
    Info {
        /// Cache key (full or unambiguous prefix)
        key: String,
    },

    /// Remove cache entries
    Clear {
        /// Remove a single entry (full key or prefix); omit to clear all
        #[arg(long)]
        key: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_build() {
        let cli = Cli::parse_from([
            "laminar",
            "build",
            "--manifest",
            "deps.toml",
            "--descriptor",
            "build.toml",
            "--target-kind",
            "binary",
        ]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.manifest, PathBuf::from("deps.toml"));
                assert_eq!(args.target_kind, TargetKind::Binary);
                assert!(!args.force_rebuild);
                assert!(args.compiler.is_empty());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn cli_parses_build_with_compiler_override() {
        let cli = Cli::parse_from([
            "laminar",
            "build",
            "-m",
            "deps.toml",
            "-d",
            "build.toml",
            "-t",
            "library",
            "--force-rebuild",
            "--",
            "make",
            "deps",
        ]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.target_kind, TargetKind::Library);
                assert!(args.force_rebuild);
                assert_eq!(args.compiler, vec!["make", "deps"]);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn cli_parses_fingerprint() {
        let cli = Cli::parse_from(["laminar", "fingerprint", "--manifest", "deps.toml"]);
        match cli.command {
            Commands::Fingerprint(args) => {
                assert_eq!(args.manifest, PathBuf::from("deps.toml"));
                assert!(args.lockfile.is_none());
            }
            _ => panic!("expected Fingerprint command"),
        }
    }

    #[test]
    fn cli_parses_cache_list() {
        let cli = Cli::parse_from(["laminar", "cache", "list"]);
        match cli.command {
            Commands::Cache(args) => {
                assert!(matches!(args.action, CacheAction::List { .. }));
            }
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn cli_parses_cache_clear_with_key() {
        let cli = Cli::parse_from(["laminar", "cache", "clear", "--key", "abc123", "--yes"]);
        match cli.command {
            Commands::Cache(args) => match args.action {
                CacheAction::Clear { key, yes } => {
                    assert_eq!(key.as_deref(), Some("abc123"));
                    assert!(yes);
                }
                _ => panic!("expected Clear action"),
            },
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["laminar", "cache", "list"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["laminar", "-v", "cache", "list"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["laminar", "-vv", "cache", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
