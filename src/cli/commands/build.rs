//! Build command - run the two-phase cached dependency build

use crate::build::{BuildRequest, Orchestrator, ProcessCompiler};
use crate::cli::args::BuildArgs;
use crate::config::{Config, ConfigManager};
use crate::error::LaminarResult;
use crate::store::CacheStore;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> LaminarResult<()> {
    let pb = create_progress_bar("Preparing dependency build...");

    let cache_dir = resolve_cache_dir(&args, config);
    debug!("Cache store at {}", cache_dir.display());
    let store = CacheStore::open(cache_dir);

    let argv = if args.compiler.is_empty() {
        config.build.compiler.clone()
    } else {
        args.compiler.clone()
    };
    let artifact = args
        .artifact
        .clone()
        .unwrap_or_else(|| config.build.artifact.clone());
    let compiler = ProcessCompiler::new(argv, artifact)?.with_env(config.build.env.clone());

    let request = BuildRequest {
        manifest_path: args.manifest.clone(),
        lockfile: args.lockfile.clone(),
        descriptor_path: args.descriptor.clone(),
        unit: args.unit.clone().unwrap_or_else(|| config.build.unit.clone()),
        target_kind: args.target_kind,
        // a disabled cache behaves like a permanent miss
        force_rebuild: args.force_rebuild || !config.cache.enabled,
    };

    pb.set_message("Resolving dependency layer...");
    let orchestrator = Orchestrator::new(&store, &compiler);
    let outcome = match orchestrator.run(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    let source = if outcome.cache_hit {
        format!("reused cached layer {}", style(outcome.key.short()).cyan())
    } else if outcome.cached {
        format!("built and cached layer {}", style(outcome.key.short()).cyan())
    } else {
        format!(
            "built layer {} (store unavailable, not cached)",
            style(outcome.key.short()).cyan()
        )
    };
    println!("{} {}", style("✓").green(), source);
    println!("  descriptor: {}", outcome.descriptor_path.display());
    println!("  layer:      {}", outcome.layer_path.display());

    Ok(())
}

fn resolve_cache_dir(args: &BuildArgs, config: &Config) -> PathBuf {
    args.cache_dir
        .clone()
        .or_else(|| config.cache.dir.clone())
        .unwrap_or_else(ConfigManager::default_cache_dir)
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
