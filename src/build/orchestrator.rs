//! Build pipeline state machine
//!
//! `Start -> Fingerprinting -> CacheLookup -> {CacheHit | DependencyBuild}
//! -> SourceRestore -> Done`, with `Failed` reachable from any state. The
//! one hard rule on every failure path: the descriptor ends up referencing
//! real sources again.

use crate::build::compiler::DependencyCompiler;
use crate::error::{LaminarError, LaminarResult};
use crate::manifest::{fingerprint, CacheKey, Manifest};
use crate::placeholder::{self, TargetKind};
use crate::store::CacheStore;
use crate::substitute::BuildDescriptor;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Pipeline phases, in order of normal progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Fingerprinting,
    CacheLookup,
    CacheHit,
    DependencyBuild,
    SourceRestore,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Fingerprinting => "fingerprinting",
            Self::CacheLookup => "cache-lookup",
            Self::CacheHit => "cache-hit",
            Self::DependencyBuild => "dependency-build",
            Self::SourceRestore => "source-restore",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Inputs for one orchestrated build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Dependency manifest path
    pub manifest_path: PathBuf,
    /// Explicit lockfile path (sibling discovery when `None`)
    pub lockfile: Option<PathBuf>,
    /// Build descriptor path
    pub descriptor_path: PathBuf,
    /// Compilation-unit reference the descriptor uses for real sources
    pub unit: String,
    /// Target kind for placeholder synthesis
    pub target_kind: TargetKind,
    /// Bypass the cache lookup and rebuild the layer
    pub force_rebuild: bool,
}

/// Result of a successful build (terminal `Done`)
#[derive(Debug)]
pub struct BuildOutcome {
    /// Cache key for the manifest
    pub key: CacheKey,
    /// Whether the layer came from the cache
    pub cache_hit: bool,
    /// Whether the layer is persisted in the store (false when the store
    /// was unavailable and the run degraded to an uncached build)
    pub cached: bool,
    /// Descriptor path, restored to reference real sources
    pub descriptor_path: PathBuf,
    /// Handle to the dependency layer blob
    pub layer_path: PathBuf,
}

/// Restores the descriptor to real sources if the pipeline unwinds while
/// the placeholder swap is in effect (failure or cancellation).
struct RestoreGuard<'d> {
    descriptor: &'d BuildDescriptor,
    placeholder: String,
    unit: String,
    armed: bool,
}

impl<'d> RestoreGuard<'d> {
    fn new(descriptor: &'d BuildDescriptor, placeholder: String, unit: String) -> Self {
        Self {
            descriptor,
            placeholder,
            unit,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.descriptor.swap_sync(&self.placeholder, &self.unit) {
            Ok(()) => warn!(
                "Restored descriptor {} to real sources after aborted build",
                self.descriptor.path().display()
            ),
            Err(e) => warn!(
                "Could not restore descriptor {}: {}",
                self.descriptor.path().display(),
                e
            ),
        }
    }
}

/// Sequences the two-phase build around the cache store and the external
/// dependency compiler.
pub struct Orchestrator<'a> {
    store: &'a CacheStore,
    compiler: &'a dyn DependencyCompiler,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a CacheStore, compiler: &'a dyn DependencyCompiler) -> Self {
        Self { store, compiler }
    }

    /// Run the pipeline to `Done`, or `Failed` with the descriptor restored
    pub async fn run(&self, request: &BuildRequest) -> LaminarResult<BuildOutcome> {
        match self.run_phases(request).await {
            Ok(outcome) => {
                debug!("phase: {}", Phase::Done);
                Ok(outcome)
            }
            Err(e) => {
                debug!("phase: {}", Phase::Failed);
                Err(e)
            }
        }
    }

    async fn run_phases(&self, request: &BuildRequest) -> LaminarResult<BuildOutcome> {
        debug!("phase: {}", Phase::Fingerprinting);
        let manifest = Manifest::load(&request.manifest_path, request.lockfile.as_deref()).await?;
        let key = fingerprint(&manifest);
        info!(
            "Manifest {} -> key {}",
            request.manifest_path.display(),
            key.short()
        );

        let descriptor = BuildDescriptor::open(&request.descriptor_path)?;

        debug!("phase: {}", Phase::CacheLookup);
        let cached_entry = if request.force_rebuild {
            debug!("Force rebuild requested, bypassing cache lookup");
            None
        } else {
            match self.store.get(&key) {
                Ok(entry) => entry,
                Err(e) if e.is_recoverable() => {
                    warn!("{e}; degrading to full dependency rebuild");
                    None
                }
                Err(e) => return Err(e),
            }
        };

        if let Some(entry) = cached_entry {
            debug!("phase: {}", Phase::CacheHit);
            info!("Cache hit for {}, skipping dependency build", key.short());

            debug!("phase: {}", Phase::SourceRestore);
            descriptor.verify_references(&request.unit).await?;

            return Ok(BuildOutcome {
                key,
                cache_hit: true,
                cached: true,
                descriptor_path: request.descriptor_path.clone(),
                layer_path: entry.blob_path,
            });
        }

        debug!("phase: {}", Phase::DependencyBuild);
        let stub = placeholder::project(request.target_kind)?;
        let placeholder_ref = stub.path().to_string_lossy().into_owned();

        descriptor.swap(&request.unit, &placeholder_ref).await?;
        let mut guard = RestoreGuard::new(&descriptor, placeholder_ref.clone(), request.unit.clone());

        info!(
            "Building dependency layer with {} against placeholder {}",
            self.compiler.name(),
            request.target_kind
        );
        let layer = self.compiler.compile(descriptor.path()).await?;

        let (layer_path, cached) = match self.store.put(&key, &layer.blob) {
            Ok(entry) => (entry.blob_path, true),
            Err(e) => {
                // put outcome never blocks the build
                warn!("Could not cache dependency layer: {e}");
                (layer.artifact_path, false)
            }
        };

        debug!("phase: {}", Phase::SourceRestore);
        guard.disarm();
        descriptor.swap(&placeholder_ref, &request.unit).await?;

        Ok(BuildOutcome {
            key,
            cache_hit: false,
            cached,
            descriptor_path: request.descriptor_path.clone(),
            layer_path,
        })
    }
}
