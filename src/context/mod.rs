//! Build context resolution
//!
//! Each build step resolves one immutable context from the static
//! [`Config`](crate::config::Config) and the environment exported by the
//! build tool. Construction is all-or-nothing: the first missing key or
//! invalid address aborts it.
//!
//! | Step | Context | Purpose |
//! |------|---------|---------|
//! | prebuild | [`PrebuildContext`] | decide whether to use the remote cache |
//! | postbuild | [`PostbuildContext`] | decide whether to publish artifacts |

mod commit;
mod env;
mod postbuild;
mod prebuild;

pub use commit::RemoteCommitInfo;
pub use env::{EnvReader, EnvValue};
pub use postbuild::{BuildActionType, MachOType, PostbuildContext};
pub use prebuild::PrebuildContext;

use crate::error::{BuildCacheError, BuildCacheResult};
use std::path::{Path, PathBuf};
use url::Url;

/// Comma-separated thinned target names exported by the aggregation target
pub const THINNED_TARGETS_KEY: &str = "SPT_XCREMOTE_CACHE_THINNED_TARGETS";

/// Parse a configured cache address. Only absolute URLs are accepted.
pub(crate) fn parse_address(raw: &str) -> BuildCacheResult<Url> {
    Url::parse(raw).map_err(|_| BuildCacheError::InvalidAddress(raw.to_string()))
}

/// A target is cache-only when a non-empty allow-list excludes it
pub(crate) fn is_force_cached(focused_targets: &[String], target_name: &str) -> bool {
    !focused_targets.is_empty() && !focused_targets.iter().any(|t| t == target_name)
}

/// Split a comma-separated list, trimming names and dropping empty segments
pub(crate) fn parse_thinned_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Resolve a configured path against the source root; absolute paths win
pub(crate) fn resolve_in_root(src_root: &Path, configured: &str) -> PathBuf {
    src_root.join(expand_tilde(configured))
}

fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
