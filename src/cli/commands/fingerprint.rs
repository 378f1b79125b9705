//! Fingerprint command - print the cache key for a manifest

use crate::cli::args::FingerprintArgs;
use crate::error::LaminarResult;
use crate::manifest::{fingerprint, Manifest};

/// Execute the fingerprint command
pub async fn execute(args: FingerprintArgs) -> LaminarResult<()> {
    let manifest = Manifest::load(&args.manifest, args.lockfile.as_deref()).await?;
    let key = fingerprint(&manifest);
    println!("{}", key);
    Ok(())
}
