//! Thinned targets download for the aggregation target

use super::thinning::ThinningPlugin;
use crate::cache::layout::{local_artifact, CacheLayout};
use crate::context::PrebuildContext;
use crate::error::{BuildCacheError, BuildCacheResult};
use crate::network::{NetworkClient, SynchronousNetworkClient};
use std::path::PathBuf;
use tracing::{debug, info};

/// Downloads the artifact of every thinned target for the remote commit
pub struct ThinnedTargetsPlugin<'a> {
    context: &'a PrebuildContext,
    /// Absent when no remote commit was resolved
    client: Option<&'a dyn NetworkClient>,
    targets: Vec<String>,
    downloaded: Vec<PathBuf>,
}

impl<'a> ThinnedTargetsPlugin<'a> {
    pub fn new(
        context: &'a PrebuildContext,
        client: Option<&'a dyn NetworkClient>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            context,
            client,
            targets,
            downloaded: Vec::new(),
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Local paths of the artifacts fetched so far
    pub fn downloaded(&self) -> &[PathBuf] {
        &self.downloaded
    }
}

impl ThinningPlugin for ThinnedTargetsPlugin<'_> {
    fn name(&self) -> &str {
        "ThinnedTargets"
    }

    fn run(&mut self) -> BuildCacheResult<()> {
        let unavailable = || BuildCacheError::ForcedCacheUnavailable {
            target: self.context.target_name.clone(),
        };
        let commit = self.context.remote_commit.commit().ok_or_else(unavailable)?;
        let client = self.client.ok_or_else(unavailable)?;
        let layout = CacheLayout::new(&self.context.recommended_cache_address);

        for target in &self.targets {
            let remote = layout.artifact(commit, target)?;
            let location = local_artifact(&self.context.target_temp_dir, commit, target);
            client.download_synchronously(&remote, &location)?;
            debug!("Downloaded thinned target {} to {}", target, location.display());
            self.downloaded.push(location);
        }

        info!(
            "Fetched {} thinned target(s) for {}",
            self.downloaded.len(),
            self.context.target_name
        );
        Ok(())
    }
}
