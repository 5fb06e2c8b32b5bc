//! Post-build publishing
//!
//! A producer uploads the linked product of every target to each configured
//! cache address. Once the whole build has published, [`mark`] creates the
//! commit's readiness marker there. Consumers ignore a commit until then.

use super::layout::CacheLayout;
use crate::config::Mode;
use crate::context::{BuildActionType, PostbuildContext};
use crate::error::{BuildCacheError, BuildCacheResult};
use crate::network::{NetworkClient, SynchronousNetworkClient};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Why nothing is published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ConsumerMode,
    /// Index builds produce no linkable artifacts
    IndexBuild,
    NoRemoteCommit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ConsumerMode => "consumer mode",
            Self::IndexBuild => "index build",
            Self::NoRemoteCommit => "no remote commit available",
        };
        write!(f, "{}", reason)
    }
}

/// Outcome of the post-build decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishDecision {
    Publish { commit: String, artifact: PathBuf },
    Skip(SkipReason),
}

/// Decide whether the compiled product should be published
pub fn plan(context: &PostbuildContext) -> PublishDecision {
    if context.mode != Mode::Producer {
        return PublishDecision::Skip(SkipReason::ConsumerMode);
    }
    if context.action == BuildActionType::IndexBuild {
        return PublishDecision::Skip(SkipReason::IndexBuild);
    }
    match context.remote_commit.commit() {
        Some(commit) => PublishDecision::Publish {
            commit: commit.to_string(),
            artifact: context.product_path(),
        },
        None => PublishDecision::Skip(SkipReason::NoRemoteCommit),
    }
}

/// Upload the artifact to every cache address.
/// Returns the number of addresses published to.
pub fn publish(
    context: &PostbuildContext,
    client: &dyn NetworkClient,
    commit: &str,
    artifact: &Path,
) -> BuildCacheResult<usize> {
    if !artifact.is_file() {
        return Err(BuildCacheError::io(
            format!("reading artifact {}", artifact.display()),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    }

    for address in &context.cache_addresses {
        let layout = CacheLayout::new(address);
        let remote = layout.artifact(commit, &context.target_name)?;
        client.upload_synchronously(artifact, &remote)?;
        debug!("Uploaded {} to {}", artifact.display(), remote);
    }

    info!(
        "Published {} at {} to {} cache address(es)",
        context.target_name,
        commit,
        context.cache_addresses.len()
    );
    Ok(context.cache_addresses.len())
}

/// Mark `commit` ready on every address. Call once every target of the
/// build has been published.
pub fn mark(addresses: &[Url], client: &dyn NetworkClient, commit: &str) -> BuildCacheResult<usize> {
    for address in addresses {
        let marker = CacheLayout::new(address).marker(commit)?;
        client.create_synchronously(&marker)?;
        debug!("Created marker {}", marker);
    }
    info!("Marked {} ready on {} cache address(es)", commit, addresses.len());
    Ok(addresses.len())
}
