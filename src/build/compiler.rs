//! Dependency compiler collaborator
//!
//! The orchestrator treats the dependency compile as an opaque, potentially
//! long-running external call. The trait keeps the orchestrator testable
//! with a fake; `ProcessCompiler` is the real thing.

use crate::error::{LaminarError, LaminarResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Result of a successful dependency compile
#[derive(Debug)]
pub struct CompiledLayer {
    /// The compiled-dependency blob
    pub blob: Vec<u8>,
    /// Where the compiler left its artifact on disk
    pub artifact_path: PathBuf,
}

/// External dependency compiler invoked during the dependency-build phase
#[async_trait]
pub trait DependencyCompiler: Send + Sync {
    /// Compile dependencies against the (placeholder-substituted)
    /// descriptor and return the compiled layer.
    async fn compile(&self, descriptor_path: &Path) -> LaminarResult<CompiledLayer>;

    /// Human-readable name for display
    fn name(&self) -> &str;
}

/// Runs a configured command as the dependency compiler.
///
/// The command executes with the descriptor's directory as its working
/// directory; on success the blob is read from `artifact` (resolved
/// relative to that directory).
#[derive(Debug)]
pub struct ProcessCompiler {
    argv: Vec<String>,
    artifact: PathBuf,
    env: HashMap<String, String>,
}

impl ProcessCompiler {
    /// Create a compiler from a non-empty argv and an artifact path
    pub fn new(argv: Vec<String>, artifact: PathBuf) -> LaminarResult<Self> {
        if argv.is_empty() {
            return Err(LaminarError::User(
                "dependency compiler command is empty".to_string(),
            ));
        }
        Ok(Self {
            argv,
            artifact,
            env: HashMap::new(),
        })
    }

    /// Add environment variables for the compiler process
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

#[async_trait]
impl DependencyCompiler for ProcessCompiler {
    async fn compile(&self, descriptor_path: &Path) -> LaminarResult<CompiledLayer> {
        let workdir = descriptor_path.parent().unwrap_or_else(|| Path::new("."));
        let command_line = self.argv.join(" ");
        info!("Running dependency compiler: {}", command_line);

        let output = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .current_dir(workdir)
            .envs(&self.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| LaminarError::CompilerSpawn {
                command: command_line.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LaminarError::DependencyBuildFailed {
                command: command_line,
                code: output.status.code().unwrap_or(-1),
                stderr: error_tail(&stdout, &stderr),
            });
        }

        let artifact_path = if self.artifact.is_absolute() {
            self.artifact.clone()
        } else {
            workdir.join(&self.artifact)
        };
        debug!("Reading dependency artifact {}", artifact_path.display());

        let blob = tokio::fs::read(&artifact_path)
            .await
            .map_err(|_| LaminarError::ArtifactMissing(artifact_path.clone()))?;

        Ok(CompiledLayer {
            blob,
            artifact_path,
        })
    }

    fn name(&self) -> &str {
        &self.argv[0]
    }
}

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
fn error_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > BUILD_ERROR_TAIL_LINES {
        lines[total - BUILD_ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}
