//! Pre-build decision: reuse the remote artifact or compile locally
//!
//! A target without a remote commit, without a readiness marker, or hit by
//! a transport failure falls back to local compilation, unless it is
//! cache-only (`force_cached`), in which case the step fails.

use super::layout::{enabled_file, local_artifact, CacheLayout};
use crate::context::PrebuildContext;
use crate::error::{BuildCacheError, BuildCacheResult};
use crate::network::{NetworkClient, NetworkClientError, SynchronousNetworkClient};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Why a target compiles locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalReason {
    /// No remote commit resolved
    NoRemoteCommit,
    /// The commit has no published artifacts
    MarkerMissing,
    /// A request to the cache failed
    NetworkFailure,
}

impl fmt::Display for LocalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoRemoteCommit => "no remote commit available",
            Self::MarkerMissing => "no artifacts published for the remote commit",
            Self::NetworkFailure => "remote cache request failed",
        };
        write!(f, "{}", reason)
    }
}

/// Outcome of the pre-build step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Use the downloaded artifact
    Remote { commit: String, artifact: PathBuf },
    /// Compile locally
    Local(LocalReason),
}

impl CacheDecision {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// Decide whether `context`'s target can use the remote cache, downloading
/// its artifact when it can.
pub fn decide(
    context: &PrebuildContext,
    client: &dyn NetworkClient,
) -> BuildCacheResult<CacheDecision> {
    let Some(commit) = context.remote_commit.commit() else {
        return without_remote_commit(context);
    };

    match fetch_artifact(context, client, commit) {
        Ok(Some(artifact)) => {
            info!("Using remote artifact for {} at {}", context.target_name, commit);
            Ok(CacheDecision::Remote {
                commit: commit.to_string(),
                artifact,
            })
        }
        Ok(None) => fallback(context, LocalReason::MarkerMissing),
        Err(BuildCacheError::Network(e)) => {
            warn!("Remote cache request for {} failed: {}", context.target_name, e);
            if matches!(e, NetworkClientError::Timeout)
                && context.turn_off_remote_cache_on_first_timeout
            {
                disable_remote_cache(context);
            }
            if context.force_cached {
                return Err(BuildCacheError::Network(e));
            }
            Ok(CacheDecision::Local(LocalReason::NetworkFailure))
        }
        Err(e) => Err(e),
    }
}

/// Decision for a target with no remote commit. Needs no network client.
pub fn without_remote_commit(context: &PrebuildContext) -> BuildCacheResult<CacheDecision> {
    fallback(context, LocalReason::NoRemoteCommit)
}

/// Record the decision for later build phases of the same target
pub fn persist(context: &PrebuildContext, decision: &CacheDecision) -> BuildCacheResult<()> {
    let path = enabled_file(&context.target_temp_dir);
    match decision {
        CacheDecision::Remote { commit, .. } => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    BuildCacheError::io(format!("creating directory {}", parent.display()), e)
                })?;
            }
            fs::write(&path, commit)
                .map_err(|e| BuildCacheError::io(format!("writing {}", path.display()), e))
        }
        CacheDecision::Local(_) => match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildCacheError::io(format!("removing {}", path.display()), e)),
        },
    }
}

fn fetch_artifact(
    context: &PrebuildContext,
    client: &dyn NetworkClient,
    commit: &str,
) -> BuildCacheResult<Option<PathBuf>> {
    let layout = CacheLayout::new(&context.recommended_cache_address);

    let marker = layout.marker(commit)?;
    if !client.file_exists_synchronously(&marker)? {
        debug!("Marker {} not found", marker);
        return Ok(None);
    }

    let remote = layout.artifact(commit, &context.target_name)?;
    let artifact = local_artifact(&context.target_temp_dir, commit, &context.target_name);
    client.download_synchronously(&remote, &artifact)?;
    debug!("Downloaded {} to {}", remote, artifact.display());
    Ok(Some(artifact))
}

fn fallback(context: &PrebuildContext, reason: LocalReason) -> BuildCacheResult<CacheDecision> {
    if context.force_cached {
        return Err(BuildCacheError::ForcedCacheUnavailable {
            target: context.target_name.clone(),
        });
    }
    info!("Compiling {} locally: {}", context.target_name, reason);
    Ok(CacheDecision::Local(reason))
}

/// Empty the commit marker so every later target sees no remote commit.
/// Best effort: this target falls back either way.
fn disable_remote_cache(context: &PrebuildContext) {
    let location = &context.remote_commit_location;
    warn!(
        "Disabling remote cache for all targets after a timeout ({})",
        location.display()
    );
    if let Err(e) = fs::write(location, "") {
        warn!("Could not clear {}: {}", location.display(), e);
    }
}
