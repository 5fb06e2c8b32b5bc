//! Addresses of cache objects
//!
//! Under a cache root `R`:
//!
//! | Object | Address |
//! |--------|---------|
//! | readiness marker | `R/marker/<commit>` |
//! | target artifact | `R/file/<commit>/<target>` |
//!
//! Locally, downloaded artifacts land in `<target temp dir>/buildcache/`.

use crate::error::{BuildCacheError, BuildCacheResult};
use std::path::{Path, PathBuf};
use url::Url;

/// Local working directory name inside the target temp dir
const LOCAL_DIR: &str = "buildcache";

/// File whose presence tells later build phases the remote artifact is used
const ENABLED_FILE: &str = "rc.enabled";

/// Maps commits and targets to addresses under one cache root
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: Url,
}

impl CacheLayout {
    pub fn new(root: &Url) -> Self {
        Self { root: root.clone() }
    }

    /// Marker created once every artifact of `commit` is uploaded
    pub fn marker(&self, commit: &str) -> BuildCacheResult<Url> {
        self.address(&["marker", commit])
    }

    /// Artifact of `target` built at `commit`
    pub fn artifact(&self, commit: &str, target: &str) -> BuildCacheResult<Url> {
        self.address(&["file", commit, target])
    }

    fn address(&self, segments: &[&str]) -> BuildCacheResult<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| BuildCacheError::InvalidAddress(self.root.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Where a downloaded artifact is stored locally
pub fn local_artifact(target_temp_dir: &Path, commit: &str, target: &str) -> PathBuf {
    target_temp_dir.join(LOCAL_DIR).join(commit).join(target)
}

/// File marking that the remote artifact is in use for this target
pub fn enabled_file(target_temp_dir: &Path) -> PathBuf {
    target_temp_dir.join(LOCAL_DIR).join(ENABLED_FILE)
}
