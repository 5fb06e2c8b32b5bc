//! Context for the pre-build step

use super::env::EnvReader;
use super::{
    is_force_cached, parse_address, parse_thinned_targets, resolve_in_root, RemoteCommitInfo,
    THINNED_TARGETS_KEY,
};
use crate::config::Config;
use crate::error::BuildCacheResult;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Everything the pre-build step needs, resolved once per invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrebuildContext {
    pub target_name: String,
    pub target_temp_dir: PathBuf,
    pub products_dir: PathBuf,
    pub module_name: Option<String>,
    /// Commit to reuse remote artifacts from
    pub remote_commit: RemoteCommitInfo,
    /// File that holds the remote commit sha
    pub remote_commit_location: PathBuf,
    pub recommended_cache_address: Url,
    /// Never fall back to local compilation
    pub force_cached: bool,
    /// List of all target compilation invocations so far
    pub compilation_history_file: PathBuf,
    /// Any request timeout disables the remote cache for all targets
    pub turn_off_remote_cache_on_first_timeout: bool,
    /// Targets to download for the thinning aggregation target. `None` when
    /// the key is absent, unlike an explicitly empty list.
    pub thinned_targets: Option<Vec<String>>,
}

impl PrebuildContext {
    pub fn new(config: &Config, vars: &HashMap<String, String>) -> BuildCacheResult<Self> {
        let env = EnvReader::new(vars);

        let target_temp_dir: PathBuf = env.required("TARGET_TEMP_DIR")?;
        let products_dir = env.required("BUILT_PRODUCTS_DIR")?;
        let module_name = env.optional("PRODUCT_MODULE_NAME");
        let src_root: PathBuf = env.required("SRCROOT")?;

        let remote_commit_location = resolve_in_root(&src_root, &config.paths.remote_commit_file);
        let remote_commit = RemoteCommitInfo::read_from(&remote_commit_location);

        let recommended_cache_address = parse_address(&config.cache.recommended_cache_address)?;
        let target_name: String = env.required("TARGET_NAME")?;
        let force_cached = is_force_cached(&config.targets.focused_targets, &target_name);
        let compilation_history_file =
            target_temp_dir.join(&config.paths.compilation_history_file);
        let thinned_targets = env
            .optional::<String>(THINNED_TARGETS_KEY)
            .map(|raw| parse_thinned_targets(&raw));

        debug!(
            "Prebuild context for {}: commit {:?}, force_cached {}",
            target_name, remote_commit, force_cached
        );

        Ok(Self {
            target_name,
            target_temp_dir,
            products_dir,
            module_name,
            remote_commit,
            remote_commit_location,
            recommended_cache_address,
            force_cached,
            compilation_history_file,
            turn_off_remote_cache_on_first_timeout: config
                .cache
                .turn_off_remote_cache_on_first_timeout,
            thinned_targets,
        })
    }
}
